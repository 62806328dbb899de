//! Error types for the AWS backend.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised by the AWS backend.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AwsBackendError {
    /// Raised when the credential or poller configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Wrapper for provider level failures, including authentication and
    /// network errors surfaced by the SDK.
    #[error("provider error in region {region}: {message}")]
    Provider {
        /// Region the failing call targeted.
        region: String,
        /// Message returned by the provider SDK.
        message: String,
    },
}

impl AwsBackendError {
    /// Wraps an SDK failure, preserving the region for context.
    #[must_use]
    pub fn provider(region: &str, message: impl Into<String>) -> Self {
        Self::Provider {
            region: region.to_owned(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for AwsBackendError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
