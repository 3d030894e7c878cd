//! The polling loop tying fingerprinting and reload dispatch together.

use super::fingerprint::{Change, FingerprintTable, diff, snapshot};
use super::settings::{TargetSpec, WatchSet};
use crate::error::Result;
use crate::reload::{KillSender, ProcFs, ProcessTable, ReloadDispatcher, SignalSender};
use std::time::Duration;
use tokio::time::sleep;

/// Outcome of the dispatch triggered by one changed path.
#[derive(Debug)]
pub struct DispatchRecord {
    /// The change that triggered the dispatch
    pub change: Change,
    /// Pid signalled, or why the reload did not happen
    pub outcome: Result<i32>,
}

/// Everything that happened during one tick, in watch order.
#[derive(Debug, Default)]
pub struct TickReport {
    /// One record per changed path
    pub dispatches: Vec<DispatchRecord>,
}

impl TickReport {
    /// Whether no watched file changed during the tick.
    pub fn is_quiet(&self) -> bool {
        self.dispatches.is_empty()
    }
}

/// Polls the watched files and reloads the target process when one changes.
///
/// The watcher exclusively owns the baseline table. Every changed path gets its
/// own dispatch, and its baseline entry advances right after that dispatch
/// whether or not the signal was delivered, so a failed reload is not retried.
///
/// # Examples
///
/// ```rust,no_run
/// use config_watcher::core::{TargetSpec, Watcher};
///
/// # async fn example() -> config_watcher::error::Result<()> {
/// let spec = TargetSpec::from_env()?;
/// Watcher::new(&spec).run().await;
/// # Ok(())
/// # }
/// ```
pub struct Watcher<P = ProcFs, S = KillSender> {
    watch_set: WatchSet,
    poll_interval: Duration,
    dispatcher: ReloadDispatcher<P, S>,
    baseline: FingerprintTable,
    initialized: bool,
}

impl Watcher {
    /// Create a watcher that signals real processes.
    pub fn new(spec: &TargetSpec) -> Self {
        Self::with_dispatcher(spec, ReloadDispatcher::from_spec(spec))
    }
}

impl<P: ProcessTable, S: SignalSender> Watcher<P, S> {
    /// Create a watcher with a custom dispatcher.
    pub fn with_dispatcher(spec: &TargetSpec, dispatcher: ReloadDispatcher<P, S>) -> Self {
        Self {
            watch_set: spec.watch_set.clone(),
            poll_interval: spec.poll_interval,
            dispatcher,
            baseline: FingerprintTable::new(),
            initialized: false,
        }
    }

    /// Take the baseline snapshot.
    pub fn initialize(&mut self) -> &FingerprintTable {
        self.baseline = snapshot(self.watch_set.iter());
        self.initialized = true;

        tracing::info!(files = self.baseline.len(), "Initialized fingerprints");
        for (path, fingerprint) in self.baseline.iter() {
            tracing::info!("\t{} => {}", path.display(), fingerprint);
        }
        &self.baseline
    }

    /// Run one poll cycle without the trailing sleep.
    ///
    /// Changed paths are dispatched one after another in watch order. If the
    /// watcher was not initialized yet, this takes the baseline instead and
    /// reports no changes.
    pub async fn tick(&mut self) -> TickReport {
        if !self.initialized {
            self.initialize();
            return TickReport::default();
        }

        let current = snapshot(self.watch_set.iter());
        let changes = diff(&self.baseline, &current);
        tracing::debug!(
            files = current.len(),
            changed = changes.len(),
            "Checked watched files"
        );

        let mut report = TickReport::default();
        for change in changes {
            tracing::info!(
                path = %change.path.display(),
                old = %change.old,
                new = %change.new,
                "File changed"
            );

            let outcome = self.dispatcher.dispatch().await;
            match &outcome {
                Ok(pid) => tracing::info!(pid, "Reloaded process"),
                Err(e) => tracing::warn!(error = %e, "Unable to reload process"),
            }

            self.baseline.insert(&change.path, change.new.clone());
            report.dispatches.push(DispatchRecord { change, outcome });
        }
        report
    }

    /// Initialize, then poll forever.
    pub async fn run(mut self) {
        if !self.initialized {
            self.initialize();
        }
        loop {
            self.tick().await;
            sleep(self.poll_interval).await;
        }
    }

    /// The current baseline.
    pub fn baseline(&self) -> &FingerprintTable {
        &self.baseline
    }
}
