//! Backend abstraction for listing cloud compute and block-storage inventory.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// A compute instance as reported by the provider.
///
/// This is a read-only snapshot taken at poll time; it is never written back
/// to the provider.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ec2Instance {
    /// Provider instance identifier (for example `i-0abc123`).
    pub id: String,
    /// Value of the `Name` tag, when one is set.
    pub name: Option<String>,
    /// Lifecycle state reported by the provider (`running`, `stopped`, ...).
    pub state: String,
    /// Commercial instance type (for example `t3.micro`).
    pub instance_type: String,
}

/// A block-storage volume as reported by the provider.
///
/// Attachment is exclusive: a volume references at most one owning instance.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EbsVolume {
    /// Provider volume identifier (for example `vol-0abc123`).
    pub id: String,
    /// Volume state reported by the provider (`in-use`, `available`, ...).
    pub state: String,
    /// Provisioned size in GiB.
    pub size_gib: i64,
    /// Volume type (for example `gp3`).
    pub volume_type: String,
    /// Identifier of the instance this volume is attached to, when attached.
    pub instance_id: Option<String>,
}

impl EbsVolume {
    /// Returns `true` when the volume has no owning instance.
    #[must_use]
    pub const fn is_unattached(&self) -> bool {
        self.instance_id.is_none()
    }
}

/// Future returned by backend operations.
pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Minimal read-only interface implemented by cloud inventory backends.
pub trait Backend {
    /// Provider specific error type returned by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lists every compute instance in the given region.
    fn list_instances<'a>(
        &'a self,
        region: &'a str,
    ) -> BackendFuture<'a, Vec<Ec2Instance>, Self::Error>;

    /// Lists every block-storage volume in the given region.
    fn list_volumes<'a>(
        &'a self,
        region: &'a str,
    ) -> BackendFuture<'a, Vec<EbsVolume>, Self::Error>;
}
