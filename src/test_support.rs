//! Test support utilities shared across unit and integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::backend::{Backend, BackendFuture, EbsVolume, Ec2Instance};

/// Error type produced by [`ScriptedBackend`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("scripted failure: {0}")]
pub struct ScriptedBackendError(
    /// Message the scripted failure carries.
    pub String,
);

/// Records a single listing call made through [`ScriptedBackend`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingCall {
    /// Data kind requested (`instances` or `volumes`).
    pub kind: &'static str,
    /// Region passed to the call.
    pub region: String,
}

/// Backend double that returns pre-seeded inventory per region.
///
/// Used to drive deterministic poll outcomes without touching the provider.
/// Every call is recorded so tests can assert on cache behaviour.
#[derive(Clone, Debug, Default)]
pub struct ScriptedBackend {
    instances: Arc<Mutex<HashMap<String, Vec<Ec2Instance>>>>,
    volumes: Arc<Mutex<HashMap<String, Vec<EbsVolume>>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<ListingCall>>>,
}

impl ScriptedBackend {
    /// Creates a backend with no seeded inventory; unknown regions return
    /// empty lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the instance list for a region.
    #[must_use]
    pub fn with_instances(self, region: &str, instances: Vec<Ec2Instance>) -> Self {
        lock(&self.instances).insert(region.to_owned(), instances);
        self
    }

    /// Seeds the volume list for a region.
    #[must_use]
    pub fn with_volumes(self, region: &str, volumes: Vec<EbsVolume>) -> Self {
        lock(&self.volumes).insert(region.to_owned(), volumes);
        self
    }

    /// Makes every call targeting `region` fail with the given message.
    #[must_use]
    pub fn with_failing_region(self, region: &str, message: &str) -> Self {
        lock(&self.failures).insert(region.to_owned(), message.to_owned());
        self
    }

    /// Returns a snapshot of all calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ListingCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls recorded so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn record(&self, kind: &'static str, region: &str) -> Result<(), ScriptedBackendError> {
        lock(&self.calls).push(ListingCall {
            kind,
            region: region.to_owned(),
        });
        lock(&self.failures)
            .get(region)
            .map_or(Ok(()), |message| Err(ScriptedBackendError(message.clone())))
    }
}

impl Backend for ScriptedBackend {
    type Error = ScriptedBackendError;

    fn list_instances<'a>(
        &'a self,
        region: &'a str,
    ) -> BackendFuture<'a, Vec<Ec2Instance>, Self::Error> {
        Box::pin(async move {
            self.record("instances", region)?;
            Ok(lock(&self.instances).get(region).cloned().unwrap_or_default())
        })
    }

    fn list_volumes<'a>(
        &'a self,
        region: &'a str,
    ) -> BackendFuture<'a, Vec<EbsVolume>, Self::Error> {
        Box::pin(async move {
            self.record("volumes", region)?;
            Ok(lock(&self.volumes).get(region).cloned().unwrap_or_default())
        })
    }
}

/// Builds an instance fixture with fixed state and type.
#[must_use]
pub fn instance_fixture(id: &str, name: Option<&str>) -> Ec2Instance {
    Ec2Instance {
        id: id.to_owned(),
        name: name.map(ToOwned::to_owned),
        state: String::from("running"),
        instance_type: String::from("t3.micro"),
    }
}

/// Builds a volume fixture attached to the given instance, if any.
#[must_use]
pub fn volume_fixture(id: &str, instance_id: Option<&str>) -> EbsVolume {
    EbsVolume {
        id: id.to_owned(),
        state: instance_id.map_or_else(|| String::from("available"), |_| String::from("in-use")),
        size_gib: 8,
        volume_type: String::from("gp3"),
        instance_id: instance_id.map(ToOwned::to_owned),
    }
}

fn lock<T>(target: &Arc<Mutex<T>>) -> MutexGuard<'_, T> {
    target
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
