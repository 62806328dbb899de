//! Orchestrates a polling pass across regions.
//!
//! For each region the orchestrator serves inventory from the newest snapshot
//! in the results tree when it is fresh enough, and otherwise calls the
//! backend and records a new snapshot. Any failure aborts the pass; no
//! partial snapshot is written for a failed fetch.

use std::future::Future;
use std::time::Duration;

use camino::Utf8Path;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::backend::{Backend, EbsVolume, Ec2Instance};
use crate::results_store::{DataKind, ResultsStore, StoreError};

const DEFAULT_FRESHNESS: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors surfaced while performing a polling pass.
#[derive(Debug, Error)]
pub enum PollError<BackendError>
where
    BackendError: std::error::Error + 'static,
{
    /// Raised when a provider listing call fails.
    #[error("failed to list {kind} in region {region}: {source}")]
    Provider {
        /// Region the failing call targeted.
        region: String,
        /// Data kind being listed (`instances` or `volumes`).
        kind: &'static str,
        /// Provider-specific error.
        #[source]
        source: BackendError,
    },
    /// Raised when the results tree cannot be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Combined inventory gathered across all polled regions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PollOutcome {
    /// Every instance returned, across all regions.
    pub instances: Vec<Ec2Instance>,
    /// Every volume returned, across all regions.
    pub volumes: Vec<EbsVolume>,
}

/// Executes the poll workflow using the provided backend and results store.
#[derive(Clone, Debug)]
pub struct PollOrchestrator<B: Backend> {
    backend: B,
    store: ResultsStore,
    freshness: Duration,
    force_refresh: bool,
}

impl<B: Backend> PollOrchestrator<B> {
    /// Creates a new orchestrator with the default 24 hour freshness window.
    #[must_use]
    pub const fn new(backend: B, store: ResultsStore) -> Self {
        Self {
            backend,
            store,
            freshness: DEFAULT_FRESHNESS,
            force_refresh: false,
        }
    }

    /// Overrides the freshness window below which snapshots are reused.
    #[must_use]
    pub const fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Forces provider calls even when a fresh snapshot exists.
    #[must_use]
    pub const fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Polls every region sequentially and returns the combined inventory.
    ///
    /// The results tree for `ident` is created first, so a snapshot directory
    /// always exists for each region visited.
    ///
    /// # Errors
    ///
    /// Returns [`PollError`] when the results tree cannot be prepared, a
    /// provider call fails, or a snapshot cannot be read or written.
    pub async fn poll(
        &self,
        ident: &str,
        regions: &[String],
    ) -> Result<PollOutcome, PollError<B::Error>> {
        self.store.ensure_tree(ident, regions)?;

        let mut outcome = PollOutcome::default();
        for region in regions {
            let instance_dir = self.store.data_dir(ident, region, DataKind::Instances);
            let instances = self
                .cached_or_fetch(
                    &instance_dir,
                    region,
                    DataKind::Instances,
                    self.backend.list_instances(region),
                )
                .await?;
            outcome.instances.extend(instances);

            let volume_dir = self.store.data_dir(ident, region, DataKind::Volumes);
            let volumes = self
                .cached_or_fetch(
                    &volume_dir,
                    region,
                    DataKind::Volumes,
                    self.backend.list_volumes(region),
                )
                .await?;
            outcome.volumes.extend(volumes);
        }
        Ok(outcome)
    }

    /// Serves the newest fresh snapshot, or awaits `fetch` and records the
    /// result. The fetch future is dropped unawaited on a cache hit.
    async fn cached_or_fetch<T, Fut>(
        &self,
        dir: &Utf8Path,
        region: &str,
        kind: DataKind,
        fetch: Fut,
    ) -> Result<Vec<T>, PollError<B::Error>>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<Vec<T>, B::Error>>,
    {
        let now = ResultsStore::now_epoch_secs()?;
        if !self.force_refresh
            && let Some(timestamp) = ResultsStore::latest_timestamp(dir)?
            && now.saturating_sub(timestamp) <= self.freshness.as_secs()
        {
            return ResultsStore::load_snapshot(dir, timestamp).map_err(PollError::from);
        }

        let items = fetch.await.map_err(|source| PollError::Provider {
            region: region.to_owned(),
            kind: kind.dir_name(),
            source,
        })?;
        ResultsStore::write_snapshot(dir, now, &items)?;
        Ok(items)
    }
}
