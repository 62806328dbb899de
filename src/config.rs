//! Configuration loading via `ortho-config` and the AWS credential
//! environment variables.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the AWS access key identifier.
pub const AWS_ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";

/// Environment variable holding the AWS secret access key.
pub const AWS_SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";

/// Regions polled when the caller does not narrow the set with `--region`.
pub const ALL_REGIONS: &[&str] = &[
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "eu-central-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "sa-east-1",
];

/// Poller configuration derived from environment variables and configuration
/// files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "VOLUMAPPER")]
pub struct PollerConfig {
    /// Root directory of the results tree. Defaults to `results`.
    #[ortho_config(default = Utf8PathBuf::from("results"))]
    pub results_dir: Utf8PathBuf,
    /// Age in seconds below which a cached snapshot is served instead of the
    /// provider API. Defaults to 24 hours.
    #[ortho_config(default = 86_400)]
    pub freshness_secs: u64,
}

impl PollerConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("volumapper")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the regions to poll: the caller's selection when non-empty,
    /// otherwise [`ALL_REGIONS`]. Duplicates in the selection are dropped
    /// while preserving first-seen order.
    #[must_use]
    pub fn regions(selection: &[String]) -> Vec<String> {
        if selection.is_empty() {
            return ALL_REGIONS.iter().map(|region| (*region).to_owned()).collect();
        }

        let mut seen = std::collections::BTreeSet::new();
        selection
            .iter()
            .filter(|region| seen.insert(region.as_str().to_owned()))
            .cloned()
            .collect()
    }
}

/// AWS credentials sourced from the process environment.
///
/// The poller refuses to contact the provider without both values present and
/// non-blank.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AwsCredentials {
    /// Access key identifier (sometimes treated as public).
    pub access_key_id: String,
    /// Secret access key (never logged or persisted).
    pub secret_access_key: String,
}

impl AwsCredentials {
    /// Reads credentials from the standard AWS environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the variable to set when
    /// either value is absent or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_key_id = require_env_var("AWS access key ID", AWS_ACCESS_KEY_ID_ENV)?;
        let secret_access_key =
            require_env_var("AWS secret access key", AWS_SECRET_ACCESS_KEY_ENV)?;
        Ok(Self {
            access_key_id,
            secret_access_key,
        })
    }
}

fn require_env_var(description: &str, env_var: &str) -> Result<String, ConfigError> {
    let value = std::env::var(env_var).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingField(format!(
            "missing {description}: set {env_var} in the environment"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration value is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn regions_defaults_to_builtin_list() {
        let regions = PollerConfig::regions(&[]);
        assert_eq!(regions.len(), ALL_REGIONS.len());
        assert_eq!(regions.first().map(String::as_str), Some("us-east-1"));
    }

    #[rstest]
    fn regions_deduplicates_preserving_order() {
        let selection = vec![
            String::from("eu-west-1"),
            String::from("us-east-1"),
            String::from("eu-west-1"),
        ];
        let regions = PollerConfig::regions(&selection);
        assert_eq!(regions, vec!["eu-west-1", "us-east-1"]);
    }

    #[rstest]
    fn require_env_var_reports_unset_variable() {
        let err = require_env_var("AWS access key ID", "VOLUMAPPER_TEST_UNSET_VAR")
            .expect_err("unset variable should be rejected");
        assert_eq!(
            err,
            ConfigError::MissingField(String::from(
                "missing AWS access key ID: set VOLUMAPPER_TEST_UNSET_VAR in the environment"
            ))
        );
    }
}
