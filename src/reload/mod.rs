//! Reload dispatch: finding the target process and signalling it.

mod dispatcher;
mod process;
mod signal;

pub use dispatcher::ReloadDispatcher;
pub use process::{ProcFs, ProcessEntry, ProcessTable, find_pid_by_name};
pub use signal::{KillSender, SignalSender};
