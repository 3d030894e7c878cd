//! Core watcher types: settings, fingerprints and the control loop.

mod control_loop;
mod fingerprint;
mod settings;

pub use control_loop::{DispatchRecord, TickReport, Watcher};
pub use fingerprint::{Change, Fingerprint, FingerprintTable, diff, snapshot};
pub use settings::{DEFAULT_DURATION_SECS, TargetSpec, TargetSpecBuilder, WatchSet, parse_signal};
