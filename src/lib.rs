//! # config-watcher
//!
//! Sidecar that polls mounted configuration files and signals a process to
//! reload when their content changes.
//!
//! ## Overview
//!
//! A single control loop:
//! - Fingerprints every watched file (SHA-256 of the full content) each tick
//! - Compares the fingerprints against a remembered baseline
//! - For each changed file, waits a grace period, finds the target process by
//!   executable name and sends it the configured signal
//!
//! Configuration comes from the environment:
//!
//! | Variable | Required | Meaning |
//! |---|---|---|
//! | `TARGET_FILES` | yes | comma-separated files to watch |
//! | `TARGET_PROCESS` | yes | executable name of the process to signal |
//! | `RELOAD_SIGNAL` | yes | signal name, e.g. `SIGHUP` |
//! | `VERBOSE` | no | any non-empty value enables debug logging |
//! | `SLEEP_DURATION` | no | seconds between ticks (default 1) |
//! | `SLEEP_BEFORE_RELOAD_DURATION` | no | seconds before signalling (default 1) |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use config_watcher::prelude::*;
//! use nix::sys::signal::Signal;
//! use std::time::Duration;
//!
//! # async fn example() -> config_watcher::error::Result<()> {
//! let spec = TargetSpec::builder()
//!     .with_file("/etc/app/conf.yaml")
//!     .with_process("nginx")
//!     .with_signal(Signal::SIGHUP)
//!     .with_reload_delay(Duration::from_secs(2))
//!     .build()?;
//!
//! Watcher::new(&spec).run().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod logging;
pub mod reload;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{TargetSpec, Watcher};
    pub use crate::error::{Result, ValidationError, WatcherError};
    pub use crate::reload::{ProcessTable, ReloadDispatcher, SignalSender};
}
