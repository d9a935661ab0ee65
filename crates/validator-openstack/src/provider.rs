//! OpenStack provider implementation

use crate::cli::OpenStackCli;
use async_trait::async_trait;
use validator_cloud::{CloudError, CloudProvider, ResourceState, ResourceType, Service};
use validator_config::OpenStackSettings;

/// OpenStack provider backed by the openstack CLI
pub struct OpenStackProvider {
    cli: OpenStackCli,
}

impl OpenStackProvider {
    pub fn new(cli: OpenStackCli) -> Self {
        Self { cli }
    }

    pub fn from_settings(settings: &OpenStackSettings) -> Self {
        Self::new(OpenStackCli::from_settings(settings))
    }
}

#[async_trait]
impl CloudProvider for OpenStackProvider {
    fn name(&self) -> &str {
        "openstack"
    }

    async fn get(
        &self,
        service: Service,
        resource_type: ResourceType,
        id: &str,
    ) -> validator_cloud::Result<ResourceState> {
        tracing::debug!("Reading {} '{}' from {}", resource_type, id, service);
        self.cli
            .show(resource_type, id)
            .await
            .map_err(CloudError::from)
    }

    async fn delete(
        &self,
        service: Service,
        resource_type: ResourceType,
        id: &str,
    ) -> validator_cloud::Result<()> {
        tracing::info!("Deleting {} '{}' from {}", resource_type, id, service);
        self.cli
            .delete(resource_type, id)
            .await
            .map_err(CloudError::from)
    }
}
