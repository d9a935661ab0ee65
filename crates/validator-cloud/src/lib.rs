//! OpenStack validator cloud abstractions
//!
//! This crate defines the boundary between the resource tracker and the
//! systems that actually own cloud resources.
//!
//! # Collaborators
//!
//! - **CloudProvider**: get-by-id and delete per resource type, grouped by
//!   service namespace (compute, network, image, volume)
//! - **Cpi**: the deployment tool's cloud interface, used for the resource
//!   kinds it created itself (VMs and stemcells)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                validator-tracker                 │
//! │        produce / consumes / cleanup              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                validator-cloud                   │
//! │  ┌──────────────────────┐  ┌─────────────────┐  │
//! │  │ trait CloudProvider  │  │    trait Cpi    │  │
//! │  └──────────────────────┘  └─────────────────┘  │
//! └───────┬─────────────────────────┬───────────────┘
//!         │                         │
//! ┌───────▼───────┐         ┌───────▼───────┐
//! │ openstack CLI │         │ external CPI  │
//! └───────────────┘         └───────────────┘
//! ```

pub mod error;
pub mod provider;
pub mod resource;

// Re-exports
pub use error::{CloudError, CpiError, Result};
pub use provider::{CloudProvider, Cpi};
pub use resource::{ResourceState, ResourceType, Service};
