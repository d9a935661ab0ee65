//! Resource tracking for OpenStack validation runs
//!
//! Validation tests create real cloud resources. This crate records each of
//! them, waits until the provider reports them ready and destroys whatever
//! is still alive when the run ends, even if tests failed or were
//! interrupted.
//!
//! # Example
//!
//! ```ignore
//! use validator_tracker::{FixedContext, ResourceTracker};
//!
//! let mut tracker = ResourceTracker::new(provider, cpi, Arc::new(FixedContext::new("creates a VM")));
//!
//! let vm_cid = tracker
//!     .produce("servers", Some("vm"), || async { Ok(cpi_create_vm().await?) })
//!     .await?;
//!
//! // in a later step
//! let Ok(vm_cid) = tracker.consumes("vm", None) else { return };
//!
//! assert!(tracker.cleanup().await);
//! ```

pub mod catalog;
pub mod context;
pub mod error;
pub mod fetcher;
pub mod registry;
pub mod report;
pub mod tracker;
pub mod waiter;

pub use catalog::{
    DestroyPolicy, FetchPolicy, ReadinessPredicate, ServiceCatalogEntry, resource_types,
    service_for,
};
pub use context::{FixedContext, Skip, TestContext};
pub use error::{Result, TrackerError};
pub use fetcher::ResourceFetcher;
pub use registry::{ResourceRegistry, SharedTracker, SuiteOutcome, shutdown_signal};
pub use report::{CleanupEntry, CleanupOutcome, CleanupReport, CleanupSummary};
pub use tracker::{Lifecycle, ResourceTracker, TrackedResource};
pub use waiter::wait_until_ready;
