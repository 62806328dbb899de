//! Snapshot storage for poller output.
//!
//! The results tree groups snapshots by account identifier, region, and data
//! kind:
//!
//! ```text
//! results
//!   |- AKIAEXAMPLE            (access key id)
//!   |   |- us-east-1          (region)
//!   |   |   |- instances
//!   |   |   |   |- 1463965087.json
//!   |   |   |- volumes
//!   |   |   |   |- 1463965087.json
//! ```
//!
//! File names are UTC seconds since the epoch; the newest file per data
//! directory is the authoritative snapshot.

use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

const SNAPSHOT_EXTENSION: &str = "json";

/// The two data kinds stored per region.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DataKind {
    /// Compute instance snapshots.
    Instances,
    /// Block-storage volume snapshots.
    Volumes,
}

impl DataKind {
    /// Directory name used for this kind inside a region directory.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Instances => "instances",
            Self::Volumes => "volumes",
        }
    }
}

/// Errors raised while reading or writing the results tree.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when a snapshot file does not contain valid JSON.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path that could not be parsed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the system clock reports a time before the epoch.
    #[error("system clock error: {message}")]
    Clock {
        /// Human-readable error message.
        message: String,
    },
}

/// Reads and writes timestamped JSON snapshots under a results root.
#[derive(Clone, Debug)]
pub struct ResultsStore {
    root: Utf8PathBuf,
}

impl ResultsStore {
    /// Creates a store rooted at `root`. No directories are created until
    /// [`Self::ensure_tree`] runs.
    #[must_use]
    pub const fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of the results tree.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the data directory for one identifier, region, and kind.
    #[must_use]
    pub fn data_dir(&self, ident: &str, region: &str, kind: DataKind) -> Utf8PathBuf {
        self.root.join(ident).join(region).join(kind.dir_name())
    }

    /// Creates the data directories for every region. Idempotent: existing
    /// directories are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when a directory cannot be created.
    pub fn ensure_tree(&self, ident: &str, regions: &[String]) -> Result<(), StoreError> {
        for region in regions {
            for kind in [DataKind::Instances, DataKind::Volumes] {
                let dir = self.data_dir(ident, region, kind);
                Dir::create_ambient_dir_all(&dir, ambient_authority()).map_err(|err| {
                    StoreError::Io {
                        path: dir.clone(),
                        message: err.to_string(),
                    }
                })?;
            }
        }
        Ok(())
    }

    /// Scans a data directory for the most recent snapshot timestamp.
    ///
    /// File names that are not `<integer>.<ext>` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the directory cannot be read.
    pub fn latest_timestamp(dir: &Utf8Path) -> Result<Option<u64>, StoreError> {
        let entries = dir.read_dir_utf8().map_err(|err| StoreError::Io {
            path: dir.to_path_buf(),
            message: err.to_string(),
        })?;

        let mut latest: Option<u64> = None;
        for entry in entries {
            let dir_entry = entry.map_err(|err| StoreError::Io {
                path: dir.to_path_buf(),
                message: err.to_string(),
            })?;
            let Some(timestamp) = parse_snapshot_timestamp(dir_entry.file_name()) else {
                continue;
            };
            if latest.is_none_or(|current| timestamp > current) {
                latest = Some(timestamp);
            }
        }
        Ok(latest)
    }

    /// Loads the snapshot written at `timestamp` from a data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file cannot be read and
    /// [`StoreError::Parse`] when its contents are not valid JSON.
    pub fn load_snapshot<T: DeserializeOwned>(
        dir: &Utf8Path,
        timestamp: u64,
    ) -> Result<Vec<T>, StoreError> {
        let file_name = snapshot_file_name(timestamp);
        let path = dir.join(&file_name);
        let handle = open_dir(dir)?;
        let contents = handle.read_to_string(&file_name).map_err(|err| StoreError::Io {
            path: path.clone(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|err| StoreError::Parse {
            path,
            message: err.to_string(),
        })
    }

    /// Writes a snapshot into a data directory, returning the file path.
    /// An existing file for the same timestamp is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file cannot be written and
    /// [`StoreError::Parse`] when the items cannot be serialised.
    pub fn write_snapshot<T: Serialize>(
        dir: &Utf8Path,
        timestamp: u64,
        items: &[T],
    ) -> Result<Utf8PathBuf, StoreError> {
        let file_name = snapshot_file_name(timestamp);
        let path = dir.join(&file_name);
        let rendered = serde_json::to_string_pretty(items).map_err(|err| StoreError::Parse {
            path: path.clone(),
            message: err.to_string(),
        })?;

        let handle = open_dir(dir)?;
        handle.write(&file_name, rendered).map_err(|err| StoreError::Io {
            path: path.clone(),
            message: err.to_string(),
        })?;
        Ok(path)
    }

    /// Current time as UTC seconds since the epoch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Clock`] when the system clock predates the
    /// epoch.
    pub fn now_epoch_secs() -> Result<u64, StoreError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .map_err(|err| StoreError::Clock {
                message: err.to_string(),
            })
    }
}

/// Parses `<integer>.<ext>` file names, returning the leading timestamp.
#[must_use]
pub fn parse_snapshot_timestamp(file_name: &str) -> Option<u64> {
    file_name.split('.').next().and_then(|stem| stem.parse().ok())
}

fn snapshot_file_name(timestamp: u64) -> String {
    format!("{timestamp}.{SNAPSHOT_EXTENSION}")
}

fn open_dir(dir: &Utf8Path) -> Result<Dir, StoreError> {
    Dir::open_ambient_dir(dir, ambient_authority()).map_err(|err| StoreError::Io {
        path: dir.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EbsVolume;
    use rstest::rstest;
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> ResultsStore {
        let root = Utf8PathBuf::from_path_buf(tmp.path().join("results"))
            .unwrap_or_else(|path| panic!("temp path should be utf8: {}", path.display()));
        ResultsStore::new(root)
    }

    fn sample_volume() -> EbsVolume {
        EbsVolume {
            id: String::from("vol-1"),
            state: String::from("in-use"),
            size_gib: 8,
            volume_type: String::from("gp3"),
            instance_id: Some(String::from("i-1")),
        }
    }

    #[rstest]
    fn ensure_tree_is_idempotent() {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let store = store_in(&tmp);
        let regions = vec![String::from("us-east-1")];

        store
            .ensure_tree("AKIAEXAMPLE", &regions)
            .unwrap_or_else(|err| panic!("first ensure: {err}"));
        store
            .ensure_tree("AKIAEXAMPLE", &regions)
            .unwrap_or_else(|err| panic!("second ensure: {err}"));

        for kind in [DataKind::Instances, DataKind::Volumes] {
            let dir = store.data_dir("AKIAEXAMPLE", "us-east-1", kind);
            assert!(dir.is_dir(), "missing {dir}");
        }
    }

    #[rstest]
    fn latest_timestamp_ignores_non_numeric_files() {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let store = store_in(&tmp);
        store
            .ensure_tree("id", &[String::from("us-east-1")])
            .unwrap_or_else(|err| panic!("ensure: {err}"));
        let dir = store.data_dir("id", "us-east-1", DataKind::Volumes);

        ResultsStore::write_snapshot(&dir, 100, &[sample_volume()])
            .unwrap_or_else(|err| panic!("write 100: {err}"));
        ResultsStore::write_snapshot(&dir, 200, &[sample_volume()])
            .unwrap_or_else(|err| panic!("write 200: {err}"));
        std::fs::write(dir.join("README.txt"), "not a snapshot")
            .unwrap_or_else(|err| panic!("write junk: {err}"));

        let latest = ResultsStore::latest_timestamp(&dir)
            .unwrap_or_else(|err| panic!("scan: {err}"));
        assert_eq!(latest, Some(200));
    }

    #[rstest]
    fn load_returns_what_write_stored() {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let store = store_in(&tmp);
        store
            .ensure_tree("id", &[String::from("eu-west-1")])
            .unwrap_or_else(|err| panic!("ensure: {err}"));
        let dir = store.data_dir("id", "eu-west-1", DataKind::Volumes);

        let written = vec![sample_volume()];
        ResultsStore::write_snapshot(&dir, 42, &written)
            .unwrap_or_else(|err| panic!("write: {err}"));
        let loaded: Vec<EbsVolume> = ResultsStore::load_snapshot(&dir, 42)
            .unwrap_or_else(|err| panic!("load: {err}"));

        assert_eq!(loaded, written);
    }

    #[rstest]
    fn latest_timestamp_errors_on_missing_directory() {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let store = store_in(&tmp);
        let dir = store.data_dir("id", "nowhere", DataKind::Instances);

        let Err(err) = ResultsStore::latest_timestamp(&dir) else {
            panic!("scan of missing directory should fail");
        };
        assert!(matches!(err, StoreError::Io { .. }), "unexpected: {err}");
    }

    #[rstest]
    #[case("1463965087.json", Some(1_463_965_087))]
    #[case("0.json", Some(0))]
    #[case("notes.json", None)]
    #[case(".hidden", None)]
    fn parses_snapshot_timestamps(#[case] name: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_snapshot_timestamp(name), expected);
    }
}
