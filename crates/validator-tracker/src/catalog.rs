//! Static service catalog
//!
//! Maps every resource type to its service namespace and to the small bundle
//! of behavior the tracker needs for it: how to tell it is ready, how to read
//! it and how to destroy it. Types not listed with an override fall back to
//! the provider for reads and to a generic provider delete.

use validator_cloud::{ResourceState, ResourceType, Service};

/// Pure inspection of a resource state
pub type ReadinessPredicate = fn(&ResourceState) -> bool;

/// Suffix the CPI appends to ids of light stemcells
pub const LIGHT_STEMCELL_SUFFIX: &str = " light";

/// How a resource is read by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Ask the provider
    Provider,
    /// Light stemcell ids are not backed by a provider image; everything
    /// else goes to the provider
    LightStemcell,
}

/// How a resource is destroyed during cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyPolicy {
    /// Provider delete on the type's service
    Generic,
    /// CPI `delete_vm`
    DeleteVm,
    /// CPI `delete_stemcell`
    DeleteStemcell,
}

#[derive(Clone, Copy)]
pub struct ServiceCatalogEntry {
    pub resource_type: ResourceType,
    pub service: Service,
    /// `None` means ready as soon as it exists
    pub ready: Option<ReadinessPredicate>,
    pub fetch: FetchPolicy,
    pub destroy: DestroyPolicy,
}

impl std::fmt::Debug for ServiceCatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCatalogEntry")
            .field("resource_type", &self.resource_type)
            .field("service", &self.service)
            .field("waits_for_ready", &self.ready.is_some())
            .field("fetch", &self.fetch)
            .field("destroy", &self.destroy)
            .finish()
    }
}

fn ready_flag(state: &ResourceState) -> bool {
    state.ready
}

fn image_active(state: &ResourceState) -> bool {
    state.status_is("active")
}

fn snapshot_available(state: &ResourceState) -> bool {
    state.status_is("available")
}

fn network_active(state: &ResourceState) -> bool {
    state.status_is("ACTIVE")
}

/// Catalog entry for a resource type
pub fn entry(resource_type: ResourceType) -> ServiceCatalogEntry {
    let service = service_of(resource_type);
    let mut entry = ServiceCatalogEntry {
        resource_type,
        service,
        ready: None,
        fetch: FetchPolicy::Provider,
        destroy: DestroyPolicy::Generic,
    };

    match resource_type {
        ResourceType::Servers => {
            entry.ready = Some(ready_flag);
            entry.destroy = DestroyPolicy::DeleteVm;
        }
        ResourceType::Volumes => entry.ready = Some(ready_flag),
        ResourceType::Images => {
            entry.ready = Some(image_active);
            entry.fetch = FetchPolicy::LightStemcell;
            entry.destroy = DestroyPolicy::DeleteStemcell;
        }
        ResourceType::Snapshots => entry.ready = Some(snapshot_available),
        ResourceType::Networks | ResourceType::Ports | ResourceType::Routers => {
            entry.ready = Some(network_active)
        }
        ResourceType::Flavors
        | ResourceType::KeyPairs
        | ResourceType::Subnets
        | ResourceType::FloatingIps
        | ResourceType::SecurityGroups
        | ResourceType::SecurityGroupRules => {}
    }

    entry
}

fn service_of(resource_type: ResourceType) -> Service {
    match resource_type {
        ResourceType::Flavors | ResourceType::KeyPairs | ResourceType::Servers => Service::Compute,
        ResourceType::Networks
        | ResourceType::Ports
        | ResourceType::Subnets
        | ResourceType::FloatingIps
        | ResourceType::Routers
        | ResourceType::SecurityGroups
        | ResourceType::SecurityGroupRules => Service::Network,
        ResourceType::Images => Service::Image,
        ResourceType::Volumes | ResourceType::Snapshots => Service::Volume,
    }
}

/// Look up a catalog entry by type identifier
pub fn lookup(name: &str) -> Option<ServiceCatalogEntry> {
    ResourceType::from_name(name).map(entry)
}

/// Service namespace for a type identifier; `None` for unknown types
pub fn service_for(name: &str) -> Option<Service> {
    lookup(name).map(|entry| entry.service)
}

/// Every resource type the catalog knows
pub fn resource_types() -> &'static [ResourceType] {
    &ResourceType::ALL
}

/// Comma separated list of valid type identifiers, for error messages
pub fn resource_type_names() -> String {
    resource_types()
        .iter()
        .map(ResourceType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn is_light_stemcell(id: &str) -> bool {
    id.ends_with(LIGHT_STEMCELL_SUFFIX)
}
