//! Delay-then-signal sequence run once per detected change.

use super::process::{ProcFs, ProcessTable, find_pid_by_name};
use super::signal::{KillSender, SignalSender};
use crate::core::TargetSpec;
use crate::error::Result;
use nix::sys::signal::Signal;
use std::time::Duration;
use tokio::time::sleep;

/// Signals the target process after the grace period.
///
/// Holds no state between invocations: every [`dispatch`](Self::dispatch)
/// resolves the process again, so a restarted target is found under its new pid.
///
/// # Examples
///
/// ```rust,no_run
/// use config_watcher::reload::ReloadDispatcher;
/// use nix::sys::signal::Signal;
/// use std::time::Duration;
///
/// # async fn example() -> config_watcher::error::Result<()> {
/// let dispatcher = ReloadDispatcher::new("nginx", Signal::SIGHUP, Duration::from_secs(1));
/// let pid = dispatcher.dispatch().await?;
/// println!("Reloaded process {}", pid);
/// # Ok(())
/// # }
/// ```
pub struct ReloadDispatcher<P = ProcFs, S = KillSender> {
    target: String,
    signal: Signal,
    delay: Duration,
    processes: P,
    sender: S,
}

impl ReloadDispatcher {
    /// Create a dispatcher using `/proc` for lookup and `kill(2)` for delivery.
    pub fn new(target: impl Into<String>, signal: Signal, delay: Duration) -> Self {
        Self::with_backends(target, signal, delay, ProcFs::new(), KillSender)
    }

    /// Create a dispatcher for the target described by `spec`.
    pub fn from_spec(spec: &TargetSpec) -> Self {
        Self::new(
            spec.target_process.clone(),
            spec.reload_signal,
            spec.reload_delay,
        )
    }
}

impl<P: ProcessTable, S: SignalSender> ReloadDispatcher<P, S> {
    /// Create a dispatcher with custom process lookup and signal delivery.
    pub fn with_backends(
        target: impl Into<String>,
        signal: Signal,
        delay: Duration,
        processes: P,
        sender: S,
    ) -> Self {
        Self {
            target: target.into(),
            signal,
            delay,
            processes,
            sender,
        }
    }

    /// Wait the grace period, look up the target and signal it.
    ///
    /// Returns the pid that was signalled.
    ///
    /// # Errors
    ///
    /// Returns an error if the process table cannot be read, no process has the
    /// target name, or delivery fails. Nothing is retried.
    pub async fn dispatch(&self) -> Result<i32> {
        // Give every consumer of the mounted volume time to see the new content
        sleep(self.delay).await;

        let pid = find_pid_by_name(&self.processes, &self.target)?;
        tracing::info!(signal = %self.signal, pid, process = %self.target, "Sending signal to process");
        self.sender.send(pid, self.signal)?;
        Ok(pid)
    }

    /// Name of the process this dispatcher signals.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Signal delivered on each dispatch.
    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Grace period before each signal.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
