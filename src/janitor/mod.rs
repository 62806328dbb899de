//! Results-tree manager.
//!
//! The janitor owns the lifecycle of the on-disk results tree: it prepares
//! the directory structure the poller writes into, and prunes each data
//! directory down to its newest snapshot. Both operations are idempotent.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::results_store::{ResultsStore, StoreError, parse_snapshot_timestamp};

/// Configuration for janitor operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JanitorConfig {
    /// Root directory of the results tree.
    pub results_dir: Utf8PathBuf,
}

impl JanitorConfig {
    /// Constructs a config, rejecting a blank results directory.
    ///
    /// # Errors
    ///
    /// Returns [`JanitorError::InvalidConfig`] when the path is empty.
    pub fn new(results_dir: impl Into<Utf8PathBuf>) -> Result<Self, JanitorError> {
        let results_dir = results_dir.into();
        if results_dir.as_str().trim().is_empty() {
            return Err(JanitorError::InvalidConfig {
                field: String::from("results_dir"),
            });
        }
        Ok(Self { results_dir })
    }
}

/// Summary of a cleanup sweep.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SweepSummary {
    /// Stale snapshot files deleted.
    pub deleted_files: usize,
    /// Snapshot files retained (the newest per data directory).
    pub retained_files: usize,
}

/// Errors returned by the janitor.
#[derive(Debug, Error)]
pub enum JanitorError {
    /// Raised when configuration is missing required values.
    #[error("missing {field}")]
    InvalidConfig {
        /// Name of the missing or invalid field.
        field: String,
    },
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when preparing the tree through the results store fails.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Prepares and prunes the results tree.
#[derive(Clone, Debug)]
pub struct Janitor {
    config: JanitorConfig,
}

impl Janitor {
    /// Creates a new janitor for the configured results tree.
    #[must_use]
    pub const fn new(config: JanitorConfig) -> Self {
        Self { config }
    }

    /// Ensures the data directories for `ident` exist in every region.
    /// Running twice leaves the tree unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`JanitorError::Store`] when a directory cannot be created.
    pub fn prepare(&self, ident: &str, regions: &[String]) -> Result<(), JanitorError> {
        let store = ResultsStore::new(self.config.results_dir.clone());
        store.ensure_tree(ident, regions)?;
        Ok(())
    }

    /// Deletes every snapshot except the newest in each data directory.
    ///
    /// Files whose names are not `<integer>.<ext>` are left alone. A second
    /// sweep over the same tree deletes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`JanitorError::Io`] when the tree cannot be walked or a stale
    /// file cannot be removed.
    pub fn sweep(&self) -> Result<SweepSummary, JanitorError> {
        let mut summary = SweepSummary::default();
        for ident_dir in subdirectories(&self.config.results_dir)? {
            for region_dir in subdirectories(&ident_dir)? {
                for data_dir in subdirectories(&region_dir)? {
                    sweep_data_dir(&data_dir, &mut summary)?;
                }
            }
        }
        Ok(summary)
    }
}

/// Removes all but the newest timestamped snapshot in one data directory.
fn sweep_data_dir(dir: &Utf8Path, summary: &mut SweepSummary) -> Result<(), JanitorError> {
    let mut snapshots: Vec<(u64, Utf8PathBuf)> = Vec::new();
    for entry in read_entries(dir)? {
        let Some(timestamp) = parse_snapshot_timestamp(entry.file_name()) else {
            continue;
        };
        snapshots.push((timestamp, entry.into_path()));
    }

    let Some(newest) = snapshots.iter().map(|(timestamp, _)| *timestamp).max() else {
        return Ok(());
    };

    for (timestamp, path) in snapshots {
        if timestamp == newest {
            summary.retained_files += 1;
            continue;
        }
        std::fs::remove_file(&path).map_err(|err| JanitorError::Io {
            path,
            message: err.to_string(),
        })?;
        summary.deleted_files += 1;
    }
    Ok(())
}

fn subdirectories(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, JanitorError> {
    let mut dirs = Vec::new();
    for entry in read_entries(dir)? {
        let file_type = entry.file_type().map_err(|err| JanitorError::Io {
            path: entry.path().to_path_buf(),
            message: err.to_string(),
        })?;
        if file_type.is_dir() {
            dirs.push(entry.into_path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn read_entries(dir: &Utf8Path) -> Result<Vec<camino::Utf8DirEntry>, JanitorError> {
    let reader = dir.read_dir_utf8().map_err(|err| JanitorError::Io {
        path: dir.to_path_buf(),
        message: err.to_string(),
    })?;
    reader
        .map(|entry| {
            entry.map_err(|err| JanitorError::Io {
                path: dir.to_path_buf(),
                message: err.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
