//! Discovery of running processes by executable name.

use crate::error::{Result, WatcherError};
use std::fs;
use std::path::PathBuf;

/// A running process as seen in the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    /// OS process id
    pub pid: i32,
    /// Executable name (not the full path or command line)
    pub executable: String,
}

impl ProcessEntry {
    /// Create a new entry.
    pub fn new(pid: i32, executable: impl Into<String>) -> Self {
        Self {
            pid,
            executable: executable.into(),
        }
    }
}

/// Capability to list the currently running processes.
///
/// Implement this trait to resolve processes from somewhere other than the
/// local `/proc` filesystem, or to fake the process table in tests.
pub trait ProcessTable {
    /// List running processes.
    ///
    /// # Errors
    ///
    /// Returns an error if the process table cannot be read at all. Processes
    /// that vanish while the table is being read are silently skipped.
    fn processes(&self) -> Result<Vec<ProcessEntry>>;
}

/// Find the lowest pid whose executable name is exactly `name`.
///
/// # Errors
///
/// Returns [`WatcherError::ProcessNotFound`] if nothing matches, or the
/// table's own error if it cannot be listed.
pub fn find_pid_by_name<T: ProcessTable + ?Sized>(table: &T, name: &str) -> Result<i32> {
    let processes = table.processes()?;
    tracing::debug!(count = processes.len(), name, "Searching process table");
    processes
        .into_iter()
        .filter(|p| p.executable == name)
        .map(|p| p.pid)
        .min()
        .ok_or_else(|| WatcherError::ProcessNotFound(name.to_string()))
}

/// Process table backed by a procfs mount (`/proc` on Linux).
///
/// The executable name is the command name field of `/proc/<pid>/stat`, which
/// the kernel truncates to 15 bytes.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    /// Read from the standard `/proc` mount.
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Read from a procfs mounted somewhere else.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_entry(&self, pid: i32) -> Option<ProcessEntry> {
        let stat = fs::read_to_string(self.root.join(pid.to_string()).join("stat")).ok()?;
        let executable = parse_stat_comm(&stat)?;
        Some(ProcessEntry::new(pid, executable))
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for ProcFs {
    fn processes(&self) -> Result<Vec<ProcessEntry>> {
        let dir = fs::read_dir(&self.root).map_err(|e| {
            WatcherError::ProcessList(format!("{}: {}", self.root.display(), e))
        })?;

        let mut processes: Vec<ProcessEntry> = dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse::<i32>().ok())
            .filter_map(|pid| self.read_entry(pid))
            .collect();
        processes.sort_by_key(|p| p.pid);
        Ok(processes)
    }
}

// The name sits between the first '(' and the last ')', and may itself
// contain spaces or parentheses.
fn parse_stat_comm(stat: &str) -> Option<&str> {
    let start = stat.find('(')?;
    let end = stat.rfind(')')?;
    (end > start).then(|| &stat[start + 1..end])
}
