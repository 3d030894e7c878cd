//! Log output setup.

use std::io::IsTerminal;
use tracing::Level;

/// Install the global subscriber writing timestamped lines to stdout.
///
/// Verbose mode lowers the level to DEBUG and adds the source file and line to
/// each record. Colours are only used when stdout is a terminal. Calling this
/// more than once keeps the first subscriber.
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .with_max_level(level)
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .with_file(verbose)
        .with_line_number(verbose)
        .try_init();
}
