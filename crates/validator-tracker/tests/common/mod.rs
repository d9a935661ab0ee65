use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use validator_cloud::{
    CloudError, CloudProvider, Cpi, CpiError, ResourceState, ResourceType, Service,
};
use validator_config::ReadinessConfig;
use validator_tracker::{FixedContext, ResourceTracker};

/// In-memory cloud: provider and CPI share the same resource table
#[derive(Default)]
pub struct FakeCloud {
    resources: Mutex<HashMap<String, ResourceState>>,
    failing_deletes: Mutex<HashSet<String>>,
    pub gets: Mutex<Vec<(Service, ResourceType, String)>>,
    pub deletes: Mutex<Vec<(Service, ResourceType, String)>>,
    pub cpi_calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, state: ResourceState) {
        self.resources
            .lock()
            .unwrap()
            .insert(state.id.clone(), state);
    }

    /// A resource the provider reports as ready
    pub fn insert_ready(&self, resource_type: ResourceType, id: &str, name: &str) {
        let status = match resource_type {
            ResourceType::Images => "active",
            ResourceType::Snapshots => "available",
            ResourceType::Networks | ResourceType::Ports | ResourceType::Routers => "ACTIVE",
            _ => "available",
        };
        self.insert(
            ResourceState::new(id, resource_type)
                .with_name(name)
                .with_status(status)
                .with_ready(true),
        );
    }

    /// Drop a resource behind the tracker's back
    pub fn remove(&self, id: &str) {
        self.resources.lock().unwrap().remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resources.lock().unwrap().contains_key(id)
    }

    pub fn fail_delete(&self, id: &str) {
        self.failing_deletes.lock().unwrap().insert(id.to_string());
    }

    pub fn get_count(&self) -> usize {
        self.gets.lock().unwrap().len()
    }

    pub fn delete_ids(&self) -> Vec<String> {
        self.deletes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, id)| id.clone())
            .collect()
    }

    pub fn cpi_calls(&self) -> Vec<String> {
        self.cpi_calls.lock().unwrap().clone()
    }

    fn cpi_delete(&self, call: String, id: &str) -> Result<(), CpiError> {
        self.cpi_calls.lock().unwrap().push(call);
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(CpiError::Cloud {
                message: format!("could not delete '{}'", id),
            });
        }
        self.remove(id);
        Ok(())
    }
}

#[async_trait]
impl CloudProvider for FakeCloud {
    fn name(&self) -> &str {
        "fake"
    }

    async fn get(
        &self,
        service: Service,
        resource_type: ResourceType,
        id: &str,
    ) -> Result<ResourceState, CloudError> {
        self.gets
            .lock()
            .unwrap()
            .push((service, resource_type, id.to_string()));
        self.resources
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))
    }

    async fn delete(
        &self,
        service: Service,
        resource_type: ResourceType,
        id: &str,
    ) -> Result<(), CloudError> {
        self.deletes
            .lock()
            .unwrap()
            .push((service, resource_type, id.to_string()));
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(CloudError::ApiError(format!("{} is in use", id)));
        }
        self.resources
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))
    }
}

#[async_trait]
impl Cpi for FakeCloud {
    async fn delete_vm(&self, vm_cid: &str) -> Result<(), CpiError> {
        self.cpi_delete(format!("delete_vm {}", vm_cid), vm_cid)
    }

    async fn delete_stemcell(&self, stemcell_cid: &str) -> Result<(), CpiError> {
        self.cpi_delete(format!("delete_stemcell {}", stemcell_cid), stemcell_cid)
    }
}

#[allow(dead_code)]
pub fn fast_readiness() -> ReadinessConfig {
    ReadinessConfig {
        timeout_secs: 5,
        initial_delay_ms: 100,
        max_delay_ms: 1000,
        multiplier: 2.0,
    }
}

/// Route tracker logs to the test harness; `RUST_LOG=debug` shows them
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn tracker(cloud: &Arc<FakeCloud>, context: &Arc<FixedContext>) -> ResourceTracker {
    init_tracing();
    ResourceTracker::new(cloud.clone(), cloud.clone(), context.clone())
        .with_readiness(fast_readiness())
}
