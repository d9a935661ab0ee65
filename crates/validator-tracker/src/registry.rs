//! Run-wide registry of trackers
//!
//! A validation run hands one tracker to each test group. The registry keeps
//! a handle to every tracker it created so the run can count and clean up
//! everything at the end, whatever happened to the tests.

use crate::context::TestContext;
use crate::error::Result;
use crate::report::CleanupReport;
use crate::tracker::ResourceTracker;
use futures_util::FutureExt;
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use validator_cloud::{CloudProvider, Cpi, ResourceType};
use validator_config::ReadinessConfig;

/// Tracker owned by one test group, reachable from the registry
pub type SharedTracker = Arc<tokio::sync::Mutex<ResourceTracker>>;

/// How the guarded suite ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteOutcome<T> {
    Completed(T),
    Panicked(String),
    Interrupted,
}

impl<T> SuiteOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, SuiteOutcome::Completed(_))
    }
}

pub struct ResourceRegistry {
    provider: Arc<dyn CloudProvider>,
    cpi: Arc<dyn Cpi>,
    context: Arc<dyn TestContext>,
    readiness: ReadinessConfig,
    trackers: Mutex<Vec<SharedTracker>>,
}

impl ResourceRegistry {
    pub fn new(
        provider: Arc<dyn CloudProvider>,
        cpi: Arc<dyn Cpi>,
        context: Arc<dyn TestContext>,
    ) -> Self {
        Self {
            provider,
            cpi,
            context,
            readiness: ReadinessConfig::default(),
            trackers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }

    /// Create a tracker that manages its own set of resources
    pub fn new_tracker(&self) -> SharedTracker {
        let tracker = ResourceTracker::new(
            self.provider.clone(),
            self.cpi.clone(),
            self.context.clone(),
        )
        .with_readiness(self.readiness.clone());

        let tracker = Arc::new(tokio::sync::Mutex::new(tracker));
        self.lock_trackers().push(tracker.clone());
        tracker
    }

    fn lock_trackers(&self) -> std::sync::MutexGuard<'_, Vec<SharedTracker>> {
        self.trackers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<SharedTracker> {
        self.lock_trackers().clone()
    }

    /// Live resources across all trackers
    pub async fn count(&self) -> Result<usize> {
        let mut total = 0;
        for tracker in self.snapshot() {
            total += tracker.lock().await.count().await?;
        }
        Ok(total)
    }

    /// Live resource counts per type across all trackers
    pub async fn summary(&self) -> Result<BTreeMap<ResourceType, usize>> {
        let mut summary = BTreeMap::new();
        for tracker in self.snapshot() {
            for (resource_type, count) in tracker.lock().await.live_summary().await? {
                *summary.entry(resource_type).or_insert(0) += count;
            }
        }
        Ok(summary)
    }

    /// Clean up every tracker, in creation order
    pub async fn cleanup(&self) -> CleanupReport {
        let mut report = CleanupReport::new();
        for tracker in self.snapshot() {
            report.merge(tracker.lock().await.cleanup_report().await);
        }
        report.log();
        report
    }

    /// Run `suite`, then clean up no matter how it ended
    ///
    /// A panic inside the suite and SIGINT/SIGTERM both end the suite early;
    /// cleanup runs in every case.
    ///
    /// The first call installs process-wide signal handlers that stay in
    /// place after this returns, so a later Ctrl-C no longer terminates the
    /// process by default. Binaries that own their signal handling should
    /// call [`run_guarded_until`](Self::run_guarded_until) with their own
    /// shutdown future instead.
    pub async fn run_guarded<Fut, T>(&self, suite: Fut) -> (SuiteOutcome<T>, CleanupReport)
    where
        Fut: Future<Output = T>,
    {
        self.run_guarded_until(suite, shutdown_signal()).await
    }

    /// Run `suite` until it finishes, panics or `shutdown` completes, then
    /// clean up
    pub async fn run_guarded_until<Fut, T, S>(
        &self,
        suite: Fut,
        shutdown: S,
    ) -> (SuiteOutcome<T>, CleanupReport)
    where
        Fut: Future<Output = T>,
        S: Future<Output = ()>,
    {
        let outcome = tokio::select! {
            result = AssertUnwindSafe(suite).catch_unwind() => match result {
                Ok(value) => SuiteOutcome::Completed(value),
                Err(panic) => {
                    let message = if let Some(s) = panic.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "unknown panic".to_string()
                    };
                    tracing::warn!("Suite panicked: {}", message);
                    SuiteOutcome::Panicked(message)
                }
            },
            _ = shutdown => {
                tracing::warn!("Interrupted, cleaning up tracked resources");
                SuiteOutcome::Interrupted
            }
        };

        let report = self.cleanup().await;
        (outcome, report)
    }
}

/// Completes when the process receives SIGINT or SIGTERM (Ctrl-C elsewhere)
///
/// Never completes if no handler can be installed.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let handlers = signal(SignalKind::interrupt())
            .and_then(|sigint| Ok((sigint, signal(SignalKind::terminate())?)));
        match handlers {
            Ok((mut sigint, mut sigterm)) => tokio::select! {
                _ = sigint.recv() => tracing::info!(signal = "SIGINT", "shutdown signal"),
                _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "shutdown signal"),
            },
            Err(e) => {
                tracing::warn!("Failed to install signal handlers: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("shutdown signal"),
            Err(e) => {
                tracing::warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
}
