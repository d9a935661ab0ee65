//! Resource fetcher
//!
//! Reads a resource by type and id through the service the catalog assigns
//! to it. A resource the provider cannot find is `Ok(None)`, not an error.

use crate::catalog::{self, FetchPolicy};
use std::sync::Arc;
use validator_cloud::{CloudError, CloudProvider, ResourceState, ResourceType};

pub struct ResourceFetcher {
    provider: Arc<dyn CloudProvider>,
}

impl ResourceFetcher {
    pub fn new(provider: Arc<dyn CloudProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn CloudProvider> {
        &self.provider
    }

    /// Current state of a resource, or `None` if it no longer exists
    pub async fn fetch(
        &self,
        resource_type: ResourceType,
        id: &str,
    ) -> Result<Option<ResourceState>, CloudError> {
        let entry = catalog::entry(resource_type);

        if entry.fetch == FetchPolicy::LightStemcell && catalog::is_light_stemcell(id) {
            return Ok(Some(light_stemcell(id)));
        }

        match self.provider.get(entry.service, resource_type, id).await {
            Ok(state) => Ok(Some(state)),
            Err(CloudError::ResourceNotFound(_)) => {
                tracing::debug!("{} '{}' not found on {}", resource_type, id, entry.service);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Stand-in for a light stemcell, which has no image behind it
fn light_stemcell(id: &str) -> ResourceState {
    ResourceState::new(id, ResourceType::Images)
        .with_name(format!("light_stemcell_{}", id))
        .with_status("active")
        .with_ready(true)
}
