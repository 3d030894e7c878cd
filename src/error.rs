//! Error types for config-watcher.

use nix::sys::signal::Signal;
use std::fmt;

/// Result type alias for config-watcher operations.
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Errors that can occur while configuring the watcher or dispatching a reload.
///
/// Startup errors (`InvalidConfiguration`, `LoadError`) are fatal. Every other
/// variant is produced in steady state and only ever logged by the control loop.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// The environment did not describe a usable configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Failed to collect configuration values from a source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// The running process table could not be enumerated.
    #[error("Unable to retrieve process list: {0}")]
    ProcessList(String),

    /// No running process has the target executable name.
    #[error("Did not find process '{0}'")]
    ProcessNotFound(String),

    /// The signal could not be delivered, usually because the process exited
    /// between lookup and delivery.
    #[error("Unable to send signal {signal} to process {pid}: {source}")]
    DeliveryFailed {
        /// Process id the signal was addressed to
        pid: i32,
        /// Signal that was being delivered
        signal: Signal,
        /// Underlying OS error
        #[source]
        source: nix::Error,
    },
}

impl WatcherError {
    /// Whether this error can only happen before the control loop starts.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_) | Self::LoadError(_))
    }
}

/// A problem with a single configuration value.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A required environment variable is absent or empty.
    MissingVariable(&'static str),

    /// A variable is present but its value cannot be used.
    InvalidField {
        /// The variable name
        field: &'static str,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create an invalid field error.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Collapse a list of errors into a single one.
    ///
    /// Returns `None` when the list is empty.
    pub fn from_list(mut errors: Vec<ValidationError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVariable(name) => write!(f, "Missing env variable '{}'", name),
            Self::InvalidField { field, reason } => {
                write!(f, "Env variable '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for WatcherError {
    fn from(err: ValidationError) -> Self {
        WatcherError::InvalidConfiguration(err.to_string())
    }
}
