//! Resource tracker
//!
//! Records every resource a test produces, hands produced resources to later
//! steps by name and destroys whatever is still alive at the end of a run.
//!
//! ```text
//! produce ─▶ create callback ─▶ fetch ─▶ wait for ready ─▶ record
//! consumes ─▶ first ready record with that name, or skip the test
//! cleanup ─▶ for each record: fetch ─▶ destroy policy ─▶ report
//! ```

use crate::catalog::{self, DestroyPolicy};
use crate::context::{Skip, TestContext};
use crate::error::{Result, TrackerError};
use crate::fetcher::ResourceFetcher;
use crate::report::{CleanupEntry, CleanupOutcome, CleanupReport};
use crate::waiter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use validator_cloud::{CloudError, CloudProvider, Cpi, ResourceType};
use validator_config::ReadinessConfig;

/// Where a tracked resource is in its lifecycle, as far as the tracker knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Became ready and can be consumed
    Ready,
    /// Created but never observed ready; kept so cleanup can remove it
    NotReady,
    /// Destroyed by cleanup
    Destroyed,
    /// Cleanup attempted and failed
    DestroyFailed,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifecycle::Ready => write!(f, "ready"),
            Lifecycle::NotReady => write!(f, "not ready"),
            Lifecycle::Destroyed => write!(f, "destroyed"),
            Lifecycle::DestroyFailed => write!(f, "destroy failed"),
        }
    }
}

/// One produced resource
#[derive(Debug, Clone, Serialize)]
pub struct TrackedResource {
    pub resource_type: ResourceType,

    /// Provider-assigned id, set once at creation
    pub provider_id: String,

    /// Name later steps use to consume this resource
    pub logical_name: Option<String>,

    /// Name reported by the provider at creation time (may be empty)
    pub display_name: String,

    /// Test that produced the resource
    pub origin_label: String,

    pub produced_at: DateTime<Utc>,

    pub lifecycle: Lifecycle,
}

pub struct ResourceTracker {
    fetcher: ResourceFetcher,
    cpi: Arc<dyn Cpi>,
    context: Arc<dyn TestContext>,
    readiness: ReadinessConfig,
    resources: Vec<TrackedResource>,
}

impl ResourceTracker {
    pub fn new(
        provider: Arc<dyn CloudProvider>,
        cpi: Arc<dyn Cpi>,
        context: Arc<dyn TestContext>,
    ) -> Self {
        Self {
            fetcher: ResourceFetcher::new(provider),
            cpi,
            context,
            readiness: ReadinessConfig::default(),
            resources: Vec::new(),
        }
    }

    pub fn with_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }

    /// Every type `produce` accepts
    pub fn resource_types() -> &'static [ResourceType] {
        catalog::resource_types()
    }

    /// Create and track a resource
    ///
    /// `create` performs the provider call and yields the new resource id.
    /// The resource is read back and waited on until the catalog considers
    /// it ready. When `provide_as` is given, later steps can look the id up
    /// with [`consumes`](Self::consumes).
    ///
    /// A resource that was created but did not become ready is still
    /// recorded so that cleanup removes it; the error is returned all the
    /// same.
    pub async fn produce<F, Fut>(
        &mut self,
        resource_type: &str,
        provide_as: Option<&str>,
        create: F,
    ) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<String>>,
    {
        let entry =
            catalog::lookup(resource_type).ok_or_else(|| TrackerError::InvalidResourceType {
                requested: resource_type.to_string(),
                valid: catalog::resource_type_names(),
            })?;
        let resource_type = entry.resource_type;

        let id = create()
            .await
            .map_err(|reason| TrackerError::CreationFailed {
                resource_type,
                reason,
            })?;
        tracing::info!("Created {} '{}'", resource_type, id);

        let ready = match self.fetcher.fetch(resource_type, &id).await {
            Ok(Some(state)) => {
                waiter::wait_until_ready(&self.fetcher, state, entry.ready, &self.readiness).await
            }
            Ok(None) => Err(TrackerError::ResourceVanished {
                resource_type,
                id: id.clone(),
            }),
            Err(e) => Err(e.into()),
        };

        let (display_name, lifecycle, outcome) = match ready {
            Ok(state) => (state.name, Lifecycle::Ready, Ok(())),
            // nothing left to clean up
            Err(e @ TrackerError::ResourceVanished { .. }) => return Err(e),
            Err(e) => (String::new(), Lifecycle::NotReady, Err(e)),
        };

        self.resources.push(TrackedResource {
            resource_type,
            provider_id: id.clone(),
            logical_name: provide_as.map(str::to_string),
            display_name,
            origin_label: self.context.current_test(),
            produced_at: Utc::now(),
            lifecycle,
        });

        match outcome {
            Ok(()) => {
                tracing::info!("Tracking {} '{}'", resource_type, id);
                Ok(id)
            }
            Err(e) => {
                tracing::warn!("Tracking {} '{}' for cleanup only: {}", resource_type, id, e);
                Err(e)
            }
        }
    }

    /// Provider id of the resource produced as `name`
    ///
    /// If nothing was produced under that name the current test is marked
    /// skipped with `message` (or a default naming the resource) and
    /// [`Skip`] is returned. When several resources share a name, the first
    /// one produced wins; later ones are unreachable by name but are still
    /// cleaned up.
    pub fn consumes(&self, name: &str, message: Option<&str>) -> std::result::Result<String, Skip> {
        let found = self.resources.iter().find(|resource| {
            resource.lifecycle == Lifecycle::Ready && resource.logical_name.as_deref() == Some(name)
        });

        match found {
            Some(resource) => Ok(resource.provider_id.clone()),
            None => {
                let message = message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Required resource '{}' does not exist.", name));
                self.context.mark_skipped(&message);
                Err(Skip { message })
            }
        }
    }

    /// Tracked resources the provider still reports, in production order
    pub async fn live_resources(&self) -> Result<Vec<TrackedResource>> {
        let mut live = Vec::new();
        for resource in &self.resources {
            if resource.lifecycle == Lifecycle::Destroyed {
                continue;
            }
            if self
                .fetcher
                .fetch(resource.resource_type, &resource.provider_id)
                .await?
                .is_some()
            {
                live.push(resource.clone());
            }
        }
        Ok(live)
    }

    /// Number of live resources
    pub async fn count(&self) -> Result<usize> {
        Ok(self.live_resources().await?.len())
    }

    /// Live resource counts per type
    pub async fn live_summary(&self) -> Result<BTreeMap<ResourceType, usize>> {
        let mut summary = BTreeMap::new();
        for resource in self.live_resources().await? {
            *summary.entry(resource.resource_type).or_insert(0) += 1;
        }
        Ok(summary)
    }

    /// Every record, live or not
    pub fn resources(&self) -> &[TrackedResource] {
        &self.resources
    }

    /// Destroy every live resource; true if all destroy steps succeeded
    pub async fn cleanup(&mut self) -> bool {
        let report = self.cleanup_report().await;
        report.log();
        report.is_success()
    }

    /// Destroy every live resource and report each outcome
    ///
    /// Resources are handled one at a time in production order. A failure
    /// is recorded and the loop moves on to the next resource. Resources
    /// destroyed by an earlier cleanup are not attempted again; failed ones
    /// are.
    pub async fn cleanup_report(&mut self) -> CleanupReport {
        let mut report = CleanupReport::new();
        let start = std::time::Instant::now();

        for index in 0..self.resources.len() {
            let resource = &self.resources[index];
            if resource.lifecycle == Lifecycle::Destroyed {
                continue;
            }

            let outcome = self.destroy(resource.resource_type, &resource.provider_id).await;

            let resource = &mut self.resources[index];
            match outcome {
                CleanupOutcome::Destroyed => resource.lifecycle = Lifecycle::Destroyed,
                CleanupOutcome::Failed(_) => resource.lifecycle = Lifecycle::DestroyFailed,
                CleanupOutcome::AlreadyGone => {}
            }

            report.push(CleanupEntry {
                resource_type: resource.resource_type,
                provider_id: resource.provider_id.clone(),
                display_name: resource.display_name.clone(),
                origin_label: resource.origin_label.clone(),
                outcome,
            });
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    async fn destroy(&self, resource_type: ResourceType, id: &str) -> CleanupOutcome {
        match self.fetcher.fetch(resource_type, id).await {
            Ok(Some(_)) => {}
            Ok(None) => return CleanupOutcome::AlreadyGone,
            Err(e) => return CleanupOutcome::Failed(e.to_string()),
        }

        let entry = catalog::entry(resource_type);
        tracing::info!("Destroying {} '{}'", resource_type, id);

        let result = match entry.destroy {
            DestroyPolicy::Generic => {
                match self
                    .fetcher
                    .provider()
                    .delete(entry.service, resource_type, id)
                    .await
                {
                    // deleted between the fetch and the delete
                    Err(CloudError::ResourceNotFound(_)) => Ok(()),
                    other => other.map_err(|e| e.to_string()),
                }
            }
            DestroyPolicy::DeleteVm => self.cpi.delete_vm(id).await.map_err(|e| e.to_string()),
            DestroyPolicy::DeleteStemcell => {
                self.cpi.delete_stemcell(id).await.map_err(|e| e.to_string())
            }
        };

        match result {
            Ok(()) => CleanupOutcome::Destroyed,
            Err(error) => {
                tracing::warn!("Failed to destroy {} '{}': {}", resource_type, id, error);
                CleanupOutcome::Failed(error)
            }
        }
    }
}

impl std::fmt::Debug for ResourceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTracker")
            .field("provider", &self.fetcher.provider().name())
            .field("resources", &self.resources)
            .finish()
    }
}
