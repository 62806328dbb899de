//! Core library for the volumapper tooling.
//!
//! The crate exposes a read-only backend abstraction over cloud inventory
//! APIs, an AWS implementation backed by the EC2 `Describe*` calls, the
//! volume-to-instance mapping logic, and the on-disk results tree shared by
//! the `volumapper` poller and the `volumapper-janitor` file-tree manager.

pub mod aws;
pub mod backend;
pub mod config;
pub mod janitor;
pub mod mapping;
pub mod poll;
pub mod results_store;
pub mod table;
pub mod test_support;

pub use aws::{AwsBackend, AwsBackendError};
pub use backend::{Backend, BackendFuture, EbsVolume, Ec2Instance};
pub use config::{
    ALL_REGIONS, AWS_ACCESS_KEY_ID_ENV, AWS_SECRET_ACCESS_KEY_ENV, AwsCredentials, ConfigError,
    PollerConfig,
};
pub use janitor::{Janitor, JanitorConfig, JanitorError, SweepSummary};
pub use mapping::{MappingRow, map_resources};
pub use poll::{PollError, PollOrchestrator, PollOutcome};
pub use results_store::{DataKind, ResultsStore, StoreError};
pub use table::{EMPTY_CELL_TEXT, UNATTACHED_TEXT, mapping_table};
