//! Environment variable configuration source.

use crate::error::{Result, WatcherError};
use config::Environment;
use serde::Deserialize;

/// Names of every environment variable the watcher reads.
pub const KNOWN_VARIABLES: [&str; 6] = [
    "TARGET_FILES",
    "TARGET_PROCESS",
    "RELOAD_SIGNAL",
    "VERBOSE",
    "SLEEP_DURATION",
    "SLEEP_BEFORE_RELOAD_DURATION",
];

/// Unvalidated configuration values exactly as found in the environment.
///
/// Every field is optional here; presence and format are checked when the
/// values are turned into a [`TargetSpec`](crate::core::TargetSpec).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    /// Comma-separated list of files to watch
    pub target_files: Option<String>,
    /// Executable name of the process to signal
    pub target_process: Option<String>,
    /// Symbolic signal name
    pub reload_signal: Option<String>,
    /// Any non-empty value enables verbose logging
    pub verbose: Option<String>,
    /// Seconds between poll ticks
    pub sleep_duration: Option<String>,
    /// Seconds to wait before signalling
    pub sleep_before_reload_duration: Option<String>,
}

impl RawSettings {
    /// Whether verbose logging was requested.
    ///
    /// Available before validation so logging can be set up before the
    /// remaining values are checked.
    pub fn verbose(&self) -> bool {
        self.verbose.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// Environment variable configuration source.
///
/// Only the variables listed in [`KNOWN_VARIABLES`] are collected; the rest of
/// the process environment is ignored.
///
/// # Examples
///
/// ```rust
/// use config_watcher::sources::EnvSource;
///
/// let source = EnvSource::from_pairs([
///     ("TARGET_FILES", "/etc/app/conf.yaml"),
///     ("TARGET_PROCESS", "nginx"),
///     ("RELOAD_SIGNAL", "SIGHUP"),
/// ]);
/// let raw = source.load().unwrap();
/// assert_eq!(raw.target_process.as_deref(), Some("nginx"));
/// ```
pub struct EnvSource {
    values: config::Map<String, String>,
}

impl EnvSource {
    /// Capture the watcher's variables from the current process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the variables is set to a value that is not
    /// valid unicode.
    pub fn from_process_env() -> Result<Self> {
        let mut values = config::Map::new();
        for name in KNOWN_VARIABLES {
            match std::env::var(name) {
                Ok(value) => {
                    values.insert(name.to_string(), value);
                }
                Err(std::env::VarError::NotPresent) => {}
                Err(e) => {
                    return Err(WatcherError::LoadError(format!(
                        "Failed to read env variable '{}': {}",
                        name, e
                    )));
                }
            }
        }
        Ok(Self { values })
    }

    /// Build a source from explicit name/value pairs instead of the process
    /// environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { values }
    }

    /// Load the raw, unvalidated settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the values cannot be collected or deserialized.
    pub fn load(&self) -> Result<RawSettings> {
        // Keep strings as-is; numbers and signal names are parsed during validation
        let env_source = Environment::default()
            .try_parsing(false)
            .source(Some(self.values.clone()));

        let config = config::Config::builder()
            .add_source(env_source)
            .build()
            .map_err(|e| {
                WatcherError::LoadError(format!("Failed to load environment variables: {}", e))
            })?;

        config.try_deserialize::<RawSettings>().map_err(|e| {
            WatcherError::LoadError(format!("Failed to parse environment variables: {}", e))
        })
    }
}
