//! Startup configuration: the watched files and how to reach the target process.

use crate::error::{Result, ValidationError, WatcherError};
use crate::sources::{EnvSource, RawSettings};
use nix::sys::signal::Signal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Poll interval and pre-signal delay used when the environment does not set one.
pub const DEFAULT_DURATION_SECS: u64 = 1;

/// Ordered set of distinct file paths to monitor.
///
/// Duplicates are dropped on construction, keeping the first occurrence, so
/// iteration order is the configured order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSet {
    paths: Vec<PathBuf>,
}

impl WatchSet {
    /// Create a watch set from paths in configured order.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut unique: Vec<PathBuf> = Vec::new();
        for path in paths {
            let path = path.into();
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        Self { paths: unique }
    }

    /// Parse a comma-separated list. Entries are trimmed and empty ones skipped.
    pub fn parse_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty()),
        )
    }

    /// Iterate over the paths in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Number of watched paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no paths are watched.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Operational parameters of the watcher, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Files whose content is fingerprinted each tick
    pub watch_set: WatchSet,
    /// Exact executable name of the process to signal
    pub target_process: String,
    /// Signal delivered to the target process
    pub reload_signal: Signal,
    /// Time between poll ticks
    pub poll_interval: Duration,
    /// Time between detecting a change and sending the signal
    pub reload_delay: Duration,
    /// Whether verbose logging is enabled. Always false when built with `TargetSpecBuilder`
    pub verbose: bool,
}

impl TargetSpec {
    /// Create a new builder.
    pub fn builder() -> TargetSpecBuilder {
        TargetSpecBuilder::new()
    }

    /// Load and validate the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value is
    /// malformed. All problems are reported together.
    pub fn from_env() -> Result<Self> {
        let raw = EnvSource::from_process_env()?.load()?;
        Self::from_raw(&raw)
    }

    /// Validate raw environment values into a `TargetSpec`.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::InvalidConfiguration`] listing every problem found.
    pub fn from_raw(raw: &RawSettings) -> Result<Self> {
        let mut errors = Vec::new();

        let watch_set = match required(&raw.target_files, "TARGET_FILES") {
            Ok(list) => {
                let set = WatchSet::parse_list(list);
                if set.is_empty() {
                    errors.push(ValidationError::invalid_field(
                        "TARGET_FILES",
                        "no file paths given",
                    ));
                }
                Some(set)
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let target_process = required(&raw.target_process, "TARGET_PROCESS")
            .map_err(|e| errors.push(e))
            .ok()
            .map(|name| name.trim().to_string());

        let reload_signal = required(&raw.reload_signal, "RELOAD_SIGNAL")
            .and_then(|name| {
                parse_signal(name).ok_or_else(|| {
                    ValidationError::invalid_field(
                        "RELOAD_SIGNAL",
                        format!("Unknown signal: {}", name),
                    )
                })
            })
            .map_err(|e| errors.push(e))
            .ok();

        let poll_interval = seconds_with_default(&raw.sleep_duration, "SLEEP_DURATION")
            .map_err(|e| errors.push(e))
            .ok();

        let reload_delay = seconds_with_default(
            &raw.sleep_before_reload_duration,
            "SLEEP_BEFORE_RELOAD_DURATION",
        )
        .map_err(|e| errors.push(e))
        .ok();

        if let Some(err) = ValidationError::from_list(errors) {
            return Err(err.into());
        }

        match (
            watch_set,
            target_process,
            reload_signal,
            poll_interval,
            reload_delay,
        ) {
            (Some(watch_set), Some(target_process), Some(reload_signal), Some(poll), Some(delay)) => {
                Ok(Self {
                    watch_set,
                    target_process,
                    reload_signal,
                    poll_interval: poll,
                    reload_delay: delay,
                    verbose: raw.verbose(),
                })
            }
            _ => Err(WatcherError::InvalidConfiguration(
                "incomplete configuration".to_string(),
            )),
        }
    }
}

fn required<'a>(
    value: &'a Option<String>,
    name: &'static str,
) -> std::result::Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingVariable(name)),
    }
}

fn seconds_with_default(
    value: &Option<String>,
    name: &'static str,
) -> std::result::Result<Duration, ValidationError> {
    let Some(raw) = value.as_deref() else {
        return Ok(Duration::from_secs(DEFAULT_DURATION_SECS));
    };
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| {
            ValidationError::invalid_field(
                name,
                format!("Could not convert to a non-negative integer: '{}'", raw),
            )
        })
}

/// Resolve a symbolic signal name such as `SIGHUP`, `hup` or `SigUsr1`.
pub fn parse_signal(name: &str) -> Option<Signal> {
    let upper = name.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }
    let full = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{}", upper)
    };
    Signal::from_str(&full).ok()
}

/// Builder for constructing a `TargetSpec` in code rather than from the environment.
///
/// # Examples
///
/// ```rust
/// use config_watcher::core::TargetSpec;
/// use nix::sys::signal::Signal;
/// use std::time::Duration;
///
/// let spec = TargetSpec::builder()
///     .with_file("/etc/app/conf.yaml")
///     .with_process("nginx")
///     .with_signal(Signal::SIGHUP)
///     .with_poll_interval(Duration::from_secs(2))
///     .build()
///     .unwrap();
/// assert_eq!(spec.watch_set.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TargetSpecBuilder {
    files: Vec<PathBuf>,
    process: Option<String>,
    signal: Option<Signal>,
    poll_interval: Option<Duration>,
    reload_delay: Option<Duration>,
}

impl TargetSpecBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to watch. Files keep the order they are added in.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Set the executable name of the target process.
    pub fn with_process(mut self, name: impl Into<String>) -> Self {
        self.process = Some(name.into());
        self
    }

    /// Set the signal to deliver.
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Set the poll interval (default one second).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the pre-signal delay (default one second).
    pub fn with_reload_delay(mut self, delay: Duration) -> Self {
        self.reload_delay = Some(delay);
        self
    }

    /// Build the `TargetSpec`.
    ///
    /// # Errors
    ///
    /// Returns an error if no file, no process name or no signal was given.
    pub fn build(self) -> Result<TargetSpec> {
        let watch_set = WatchSet::new(self.files);
        let mut errors = Vec::new();
        if watch_set.is_empty() {
            errors.push(ValidationError::MissingVariable("TARGET_FILES"));
        }
        let process = self.process.filter(|p| !p.is_empty());
        if process.is_none() {
            errors.push(ValidationError::MissingVariable("TARGET_PROCESS"));
        }
        if self.signal.is_none() {
            errors.push(ValidationError::MissingVariable("RELOAD_SIGNAL"));
        }
        if let Some(err) = ValidationError::from_list(errors) {
            return Err(err.into());
        }

        let default = Duration::from_secs(DEFAULT_DURATION_SECS);
        match (process, self.signal) {
            (Some(target_process), Some(reload_signal)) => Ok(TargetSpec {
                watch_set,
                target_process,
                reload_signal,
                poll_interval: self.poll_interval.unwrap_or(default),
                reload_delay: self.reload_delay.unwrap_or(default),
                verbose: false,
            }),
            _ => Err(WatcherError::InvalidConfiguration(
                "incomplete configuration".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawSettings {
        EnvSource::from_pairs(pairs.iter().copied()).load().unwrap()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("TARGET_FILES", "/etc/app/conf.yaml"),
            ("TARGET_PROCESS", "nginx"),
            ("RELOAD_SIGNAL", "SIGHUP"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let spec = TargetSpec::from_raw(&raw(&minimal())).unwrap();
        assert_eq!(spec.target_process, "nginx");
        assert_eq!(spec.reload_signal, Signal::SIGHUP);
        assert_eq!(spec.poll_interval, Duration::from_secs(1));
        assert_eq!(spec.reload_delay, Duration::from_secs(1));
        assert!(!spec.verbose);
        assert_eq!(
            spec.watch_set.iter().collect::<Vec<_>>(),
            vec![Path::new("/etc/app/conf.yaml")]
        );
    }

    #[test]
    fn test_duration_overrides() {
        let mut pairs = minimal();
        pairs.push(("SLEEP_DURATION", "10"));
        pairs.push(("SLEEP_BEFORE_RELOAD_DURATION", " 3 "));
        pairs.push(("VERBOSE", "yes"));

        let spec = TargetSpec::from_raw(&raw(&pairs)).unwrap();
        assert_eq!(spec.poll_interval, Duration::from_secs(10));
        assert_eq!(spec.reload_delay, Duration::from_secs(3));
        assert!(spec.verbose);
    }

    #[test]
    fn test_missing_required_values_reported_together() {
        let err = TargetSpec::from_raw(&RawSettings::default()).unwrap_err();
        assert!(err.is_fatal());
        let text = err.to_string();
        assert!(text.contains("TARGET_FILES"));
        assert!(text.contains("TARGET_PROCESS"));
        assert!(text.contains("RELOAD_SIGNAL"));
    }

    #[test]
    fn test_empty_required_value_is_missing() {
        let pairs = vec![
            ("TARGET_FILES", "/a"),
            ("TARGET_PROCESS", ""),
            ("RELOAD_SIGNAL", "SIGHUP"),
        ];
        let err = TargetSpec::from_raw(&raw(&pairs)).unwrap_err();
        assert!(err.to_string().contains("Missing env variable 'TARGET_PROCESS'"));
    }

    #[test]
    fn test_unknown_signal_rejected() {
        let pairs = vec![
            ("TARGET_FILES", "/a"),
            ("TARGET_PROCESS", "nginx"),
            ("RELOAD_SIGNAL", "SIGBOGUS"),
        ];
        let err = TargetSpec::from_raw(&raw(&pairs)).unwrap_err();
        assert!(err.to_string().contains("Unknown signal: SIGBOGUS"));
    }

    #[test]
    fn test_non_numeric_duration_rejected() {
        let mut pairs = minimal();
        pairs.push(("SLEEP_DURATION", "fast"));
        let err = TargetSpec::from_raw(&raw(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SLEEP_DURATION"));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let mut pairs = minimal();
        pairs.push(("SLEEP_BEFORE_RELOAD_DURATION", "-1"));
        let err = TargetSpec::from_raw(&raw(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SLEEP_BEFORE_RELOAD_DURATION"));
    }

    #[test]
    fn test_only_commas_rejected() {
        let pairs = vec![
            ("TARGET_FILES", " , ,"),
            ("TARGET_PROCESS", "nginx"),
            ("RELOAD_SIGNAL", "SIGHUP"),
        ];
        let err = TargetSpec::from_raw(&raw(&pairs)).unwrap_err();
        assert!(err.to_string().contains("no file paths given"));
    }

    #[test]
    fn test_watch_set_parse_list() {
        let set = WatchSet::parse_list(" /a/one.yaml, ./two.conf ,,/a/one.yaml,three");
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![
                Path::new("/a/one.yaml"),
                Path::new("./two.conf"),
                Path::new("three")
            ]
        );
    }

    #[test]
    fn test_parse_signal_variants() {
        assert_eq!(parse_signal("SIGHUP"), Some(Signal::SIGHUP));
        assert_eq!(parse_signal("hup"), Some(Signal::SIGHUP));
        assert_eq!(parse_signal("SigUsr1"), Some(Signal::SIGUSR1));
        assert_eq!(parse_signal("USR2"), Some(Signal::SIGUSR2));
        assert_eq!(parse_signal(""), None);
        assert_eq!(parse_signal("RELOAD"), None);
    }

    #[test]
    fn test_builder_requires_target() {
        let err = TargetSpec::builder().with_file("/a").build().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("TARGET_PROCESS"));
        assert!(text.contains("RELOAD_SIGNAL"));
    }

    #[test]
    fn test_builder_defaults() {
        let spec = TargetSpec::builder()
            .with_file("/a")
            .with_file("/a")
            .with_process("nginx")
            .with_signal(Signal::SIGUSR1)
            .build()
            .unwrap();
        assert_eq!(spec.watch_set.len(), 1);
        assert_eq!(spec.poll_interval, Duration::from_secs(DEFAULT_DURATION_SECS));
        assert_eq!(spec.reload_delay, Duration::from_secs(DEFAULT_DURATION_SECS));
    }
}
