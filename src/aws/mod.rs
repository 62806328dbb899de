//! AWS EC2 backend implementation of the inventory listing interface.

mod error;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_ec2::Client;
use aws_sdk_ec2::config::Credentials;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types as sdk;

use crate::backend::{Backend, BackendFuture, EbsVolume, Ec2Instance};
use crate::config::AwsCredentials;

pub use error::AwsBackendError;

const NAME_TAG_KEY: &str = "Name";
const UNKNOWN_FIELD: &str = "unknown";
const CREDENTIAL_PROVIDER_NAME: &str = "environment";

/// Backend that lists inventory through the EC2 `Describe*` APIs.
///
/// A fresh client is built per region; the poller visits regions
/// sequentially, so clients are not cached.
#[derive(Clone, Debug)]
pub struct AwsBackend {
    credentials: AwsCredentials,
}

impl AwsBackend {
    /// Constructs a new backend from validated credentials.
    #[must_use]
    pub const fn new(credentials: AwsCredentials) -> Self {
        Self { credentials }
    }

    async fn client_for(&self, region: &str) -> Client {
        let provider = Credentials::new(
            self.credentials.access_key_id.clone(),
            self.credentials.secret_access_key.clone(),
            None,
            None,
            CREDENTIAL_PROVIDER_NAME,
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_owned()))
            .credentials_provider(provider)
            .load()
            .await;
        Client::new(&shared)
    }

    async fn describe_instances(&self, region: &str) -> Result<Vec<Ec2Instance>, AwsBackendError> {
        let client = self.client_for(region).await;
        let response = client
            .describe_instances()
            .send()
            .await
            .map_err(|err| AwsBackendError::provider(region, DisplayErrorContext(&err).to_string()))?;

        let instances = response
            .reservations()
            .iter()
            .flat_map(sdk::Reservation::instances)
            .map(instance_from_sdk)
            .collect();
        Ok(instances)
    }

    async fn describe_volumes(&self, region: &str) -> Result<Vec<EbsVolume>, AwsBackendError> {
        let client = self.client_for(region).await;
        let response = client
            .describe_volumes()
            .send()
            .await
            .map_err(|err| AwsBackendError::provider(region, DisplayErrorContext(&err).to_string()))?;

        Ok(response.volumes().iter().map(volume_from_sdk).collect())
    }
}

impl Backend for AwsBackend {
    type Error = AwsBackendError;

    fn list_instances<'a>(
        &'a self,
        region: &'a str,
    ) -> BackendFuture<'a, Vec<Ec2Instance>, Self::Error> {
        Box::pin(self.describe_instances(region))
    }

    fn list_volumes<'a>(
        &'a self,
        region: &'a str,
    ) -> BackendFuture<'a, Vec<EbsVolume>, Self::Error> {
        Box::pin(self.describe_volumes(region))
    }
}

fn instance_from_sdk(instance: &sdk::Instance) -> Ec2Instance {
    let name = instance
        .tags()
        .iter()
        .find(|tag| tag.key() == Some(NAME_TAG_KEY))
        .and_then(sdk::Tag::value)
        .map(ToOwned::to_owned);

    Ec2Instance {
        id: instance.instance_id().unwrap_or_default().to_owned(),
        name,
        state: instance
            .state()
            .and_then(sdk::InstanceState::name)
            .map_or_else(|| UNKNOWN_FIELD.to_owned(), |state| state.as_str().to_owned()),
        instance_type: instance
            .instance_type()
            .map_or_else(|| UNKNOWN_FIELD.to_owned(), |ty| ty.as_str().to_owned()),
    }
}

fn volume_from_sdk(volume: &sdk::Volume) -> EbsVolume {
    EbsVolume {
        id: volume.volume_id().unwrap_or_default().to_owned(),
        state: volume
            .state()
            .map_or_else(|| UNKNOWN_FIELD.to_owned(), |state| state.as_str().to_owned()),
        size_gib: i64::from(volume.size().unwrap_or_default()),
        volume_type: volume
            .volume_type()
            .map_or_else(|| UNKNOWN_FIELD.to_owned(), |ty| ty.as_str().to_owned()),
        instance_id: volume
            .attachments()
            .iter()
            .find_map(sdk::VolumeAttachment::instance_id)
            .map(ToOwned::to_owned),
    }
}
