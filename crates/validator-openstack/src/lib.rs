//! OpenStack provider for the validator
//!
//! This crate implements the `CloudProvider` and `Cpi` traits so the
//! resource tracker can read, wait on and delete real OpenStack resources.
//!
//! # Requirements
//!
//! - the `openstack` CLI (python-openstackclient) must be installed
//! - authentication comes from clouds.yaml or `OS_*` environment variables
//! - VM and stemcell cleanup needs the CPI binary configured under `cpi.bin`
//!
//! # Example
//!
//! ```ignore
//! use validator_openstack::{ExternalCpi, OpenStackProvider};
//!
//! let config = validator_config::load()?;
//! let provider = OpenStackProvider::from_settings(&config.openstack);
//! let cpi = ExternalCpi::from_settings(&config.cpi)?;
//! ```

pub mod cli;
pub mod cpi;
pub mod error;
pub mod provider;

pub use cli::OpenStackCli;
pub use cpi::ExternalCpi;
pub use error::{OpenStackError, Result};
pub use provider::OpenStackProvider;
