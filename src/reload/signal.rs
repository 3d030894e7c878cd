//! Signal delivery to a resolved process id.

use crate::error::{Result, WatcherError};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Capability to deliver a signal to a process.
pub trait SignalSender {
    /// Deliver `signal` to `pid` exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::DeliveryFailed`] if the OS rejects the delivery,
    /// for instance because the process no longer exists.
    fn send(&self, pid: i32, signal: Signal) -> Result<()>;
}

/// Delivers signals with `kill(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillSender;

impl SignalSender for KillSender {
    fn send(&self, pid: i32, signal: Signal) -> Result<()> {
        signal::kill(Pid::from_raw(pid), signal).map_err(|source| {
            WatcherError::DeliveryFailed {
                pid,
                signal,
                source,
            }
        })
    }
}
