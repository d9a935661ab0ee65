//! Readiness waiting (exponential backoff, bounded by a timeout)
//!
//! Polls the provider until the catalog predicate holds for the freshest
//! state of a resource.

use crate::catalog::ReadinessPredicate;
use crate::error::{Result, TrackerError};
use crate::fetcher::ResourceFetcher;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use validator_cloud::ResourceState;
use validator_config::ReadinessConfig;

/// Provider statuses a resource never recovers from on its own
const FAILED_STATUSES: [&str; 2] = ["ERROR", "error"];

/// Wait until `predicate` holds for `resource`
///
/// # Arguments
/// * `fetcher` - used to re-read the resource between polls
/// * `resource` - state observed right after creation
/// * `predicate` - readiness check; `None` returns `resource` immediately
/// * `config` - backoff and timeout settings
///
/// # Returns
/// * `Ok(state)` - the first state that satisfied the predicate
/// * `Err(ResourceVanished)` - the provider stopped reporting the resource
/// * `Err(ResourceFailed)` - the provider put the resource into an error status
/// * `Err(ReadinessTimeout)` - the predicate did not hold within the timeout
pub async fn wait_until_ready(
    fetcher: &ResourceFetcher,
    resource: ResourceState,
    predicate: Option<ReadinessPredicate>,
    config: &ReadinessConfig,
) -> Result<ResourceState> {
    let Some(predicate) = predicate else {
        return Ok(resource);
    };

    let timeout = config.timeout();
    let deadline = Instant::now() + timeout;
    let mut current = resource;
    let mut attempt: u32 = 0;

    loop {
        if predicate(&current) {
            tracing::debug!(
                "{} '{}' ready after {} poll(s)",
                current.resource_type,
                current.id,
                attempt
            );
            return Ok(current);
        }

        if let Some(status) = current
            .status
            .as_deref()
            .filter(|status| FAILED_STATUSES.contains(status))
        {
            return Err(TrackerError::ResourceFailed {
                resource_type: current.resource_type,
                id: current.id.clone(),
                status: status.to_string(),
            });
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(TrackerError::ReadinessTimeout {
                resource_type: current.resource_type,
                id: current.id.clone(),
                timeout,
                last_status: current.status.clone(),
            });
        }

        let delay = Duration::from_millis(config.delay_for_attempt(attempt)).min(deadline - now);
        sleep(delay).await;
        attempt = attempt.saturating_add(1);

        current = match fetcher.fetch(current.resource_type, &current.id).await? {
            Some(state) => state,
            None => {
                return Err(TrackerError::ResourceVanished {
                    resource_type: current.resource_type,
                    id: current.id,
                });
            }
        };
    }
}
