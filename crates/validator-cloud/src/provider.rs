//! Provider and CPI trait definitions

use crate::error::{CpiError, Result};
use crate::resource::{ResourceState, ResourceType, Service};
use async_trait::async_trait;

/// Cloud provider abstraction trait
///
/// Implementations address resources by service namespace and type, so one
/// provider can serve every resource kind the tracker knows about.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "openstack")
    fn name(&self) -> &str;

    /// Read the current state of a resource.
    ///
    /// A resource that does not exist must be reported as
    /// [`CloudError::ResourceNotFound`](crate::CloudError::ResourceNotFound).
    async fn get(
        &self,
        service: Service,
        resource_type: ResourceType,
        id: &str,
    ) -> Result<ResourceState>;

    /// Delete a resource
    async fn delete(&self, service: Service, resource_type: ResourceType, id: &str) -> Result<()>;
}

/// The deployment tool's cloud interface
///
/// VMs and stemcells are created through the CPI during validation, so they
/// are torn down through it as well.
#[async_trait]
pub trait Cpi: Send + Sync {
    async fn delete_vm(&self, vm_cid: &str) -> std::result::Result<(), CpiError>;

    async fn delete_stemcell(&self, stemcell_cid: &str) -> std::result::Result<(), CpiError>;
}
