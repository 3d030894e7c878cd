//! Content fingerprints of watched files and change detection against a baseline.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Identity of a file's content at the moment it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// Lowercase hex SHA-256 digest of the full file content.
    Digest(String),
    /// The file could not be opened or read.
    ///
    /// Never equal to a digest, so a file disappearing counts as a change.
    Unknown,
}

impl Fingerprint {
    /// Hash everything `reader` yields.
    pub fn from_reader<R: io::Read>(mut reader: R) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(Self::Digest(hex::encode(hasher.finalize())))
    }

    /// Hash the full content of the file at `path`.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Whether this is the unreadable-file sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest(hex) => f.write_str(hex),
            Self::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// Fingerprints of every watched path, kept in watch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintTable {
    entries: Vec<(PathBuf, Fingerprint)>,
}

impl FingerprintTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint recorded for `path`, if any.
    pub fn get(&self, path: &Path) -> Option<&Fingerprint> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, fp)| fp)
    }

    /// Record `fingerprint` for `path`, replacing any previous value in place.
    /// New paths are appended.
    pub fn insert(&mut self, path: impl Into<PathBuf>, fingerprint: Fingerprint) {
        let path = path.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, existing)) => *existing = fingerprint,
            None => self.entries.push((path, fingerprint)),
        }
    }

    /// Iterate over `(path, fingerprint)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Fingerprint)> {
        self.entries.iter().map(|(p, fp)| (p.as_path(), fp))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A watched path whose fingerprint differs from its baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// The watched path
    pub path: PathBuf,
    /// Baseline fingerprint
    pub old: Fingerprint,
    /// Fingerprint observed this tick
    pub new: Fingerprint,
}

/// Fingerprint every path, in order.
///
/// Unreadable files are recorded as [`Fingerprint::Unknown`] and logged as a
/// warning; the remaining paths are still processed.
pub fn snapshot<'a, I>(paths: I) -> FingerprintTable
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut table = FingerprintTable::new();
    for path in paths {
        let fingerprint = match Fingerprint::of_file(path) {
            Ok(fp) => fp,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unable to hash file");
                Fingerprint::Unknown
            }
        };
        tracing::debug!(path = %path.display(), %fingerprint, "Fingerprinted file");
        table.insert(path, fingerprint);
    }
    table
}

/// Paths whose fingerprint in `current` differs from `baseline`, in baseline order.
///
/// A baseline path missing from `current` is treated as having become unreadable.
pub fn diff(baseline: &FingerprintTable, current: &FingerprintTable) -> Vec<Change> {
    baseline
        .iter()
        .filter_map(|(path, old)| {
            let new = current.get(path).cloned().unwrap_or(Fingerprint::Unknown);
            (*old != new).then(|| Change {
                path: path.to_path_buf(),
                old: old.clone(),
                new,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    // sha256("hello\n")
    const HELLO_DIGEST: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    #[test]
    fn test_known_digest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf.yaml");
        fs::write(&path, "hello\n").unwrap();

        let fp = Fingerprint::of_file(&path).unwrap();
        assert_eq!(fp, Fingerprint::Digest(HELLO_DIGEST.to_string()));
        assert_eq!(fp.to_string(), HELLO_DIGEST);
    }

    #[test]
    fn test_missing_file_is_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.yaml");

        let table = snapshot([path.as_path()]);
        assert_eq!(table.len(), 1);
        assert!(table.get(&path).unwrap().is_unknown());
    }

    #[test]
    fn test_snapshot_keeps_watch_order() {
        let temp_dir = TempDir::new().unwrap();
        let b = temp_dir.path().join("b");
        let a = temp_dir.path().join("a");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let table = snapshot([b.as_path(), a.as_path()]);
        let order: Vec<&Path> = table.iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec![b.as_path(), a.as_path()]);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf.yaml");
        fs::write(&path, "port: 8080").unwrap();
        let missing = temp_dir.path().join("gone.yaml");

        let first = snapshot([path.as_path(), missing.as_path()]);
        let second = snapshot([path.as_path(), missing.as_path()]);
        assert_eq!(first, second);
        assert!(diff(&first, &second).is_empty());
    }

    #[test]
    fn test_deletion_reported_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf.yaml");
        fs::write(&path, "port: 8080").unwrap();

        let mut baseline = snapshot([path.as_path()]);
        fs::remove_file(&path).unwrap();

        let current = snapshot([path.as_path()]);
        let changes = diff(&baseline, &current);
        assert_eq!(changes.len(), 1);
        assert!(!changes[0].old.is_unknown());
        assert!(changes[0].new.is_unknown());
        baseline.insert(&path, changes[0].new.clone());

        let after = snapshot([path.as_path()]);
        assert!(diff(&baseline, &after).is_empty());
    }

    #[test]
    fn test_absent_from_current_counts_as_changed() {
        let mut baseline = FingerprintTable::new();
        baseline.insert("/a", Fingerprint::Digest("aa".into()));
        baseline.insert("/b", Fingerprint::Digest("bb".into()));

        let mut current = FingerprintTable::new();
        current.insert("/b", Fingerprint::Digest("bb".into()));

        let changes = diff(&baseline, &current);
        assert_eq!(
            changes,
            vec![Change {
                path: PathBuf::from("/a"),
                old: Fingerprint::Digest("aa".into()),
                new: Fingerprint::Unknown,
            }]
        );
    }

    #[test]
    fn test_diff_reports_in_baseline_order() {
        let mut baseline = FingerprintTable::new();
        baseline.insert("/z", Fingerprint::Digest("1".into()));
        baseline.insert("/a", Fingerprint::Digest("1".into()));
        baseline.insert("/m", Fingerprint::Digest("1".into()));

        let mut current = FingerprintTable::new();
        current.insert("/a", Fingerprint::Digest("2".into()));
        current.insert("/m", Fingerprint::Digest("1".into()));
        current.insert("/z", Fingerprint::Digest("2".into()));

        let paths: Vec<PathBuf> = diff(&baseline, &current).into_iter().map(|c| c.path).collect();
        assert_eq!(paths, vec![PathBuf::from("/z"), PathBuf::from("/a")]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut table = FingerprintTable::new();
        table.insert("/a", Fingerprint::Unknown);
        table.insert("/b", Fingerprint::Unknown);
        table.insert("/a", Fingerprint::Digest("x".into()));

        assert_eq!(table.len(), 2);
        assert_eq!(table.iter().next().unwrap().0, Path::new("/a"));
        assert_eq!(table.get(Path::new("/a")), Some(&Fingerprint::Digest("x".into())));
    }

    proptest! {
        #[test]
        fn prop_same_bytes_same_fingerprint(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let a = Fingerprint::from_reader(data.as_slice()).unwrap();
            let b = Fingerprint::from_reader(data.as_slice()).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_single_byte_change_detected(
            data in proptest::collection::vec(any::<u8>(), 1..4096),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let mut altered = data.clone();
            let i = index.index(altered.len());
            altered[i] ^= flip;

            let before = Fingerprint::from_reader(data.as_slice()).unwrap();
            let after = Fingerprint::from_reader(altered.as_slice()).unwrap();
            prop_assert_ne!(before, after);
        }
    }
}
