use config_watcher::core::{TargetSpec, Watcher};
use config_watcher::logging;
use config_watcher::sources::EnvSource;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let raw = match EnvSource::from_process_env().and_then(|source| source.load()) {
        Ok(raw) => raw,
        Err(e) => {
            logging::init(false);
            tracing::error!("Fatal: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let spec = match TargetSpec::from_raw(&raw) {
        Ok(spec) => spec,
        Err(e) => {
            // Startup errors still honour VERBOSE
            logging::init(raw.verbose());
            tracing::error!("Fatal: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(spec.verbose);

    tracing::info!(
        files = spec.watch_set.len(),
        process = %spec.target_process,
        signal = %spec.reload_signal,
        poll_secs = spec.poll_interval.as_secs(),
        delay_secs = spec.reload_delay.as_secs(),
        "Starting config watcher"
    );

    Watcher::new(&spec).run().await;
    ExitCode::SUCCESS
}
