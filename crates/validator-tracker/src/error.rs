//! Resource tracker error types

use std::time::Duration;
use thiserror::Error;
use validator_cloud::{CloudError, ResourceType};

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid resource type '{requested}', use {valid}")]
    InvalidResourceType { requested: String, valid: String },

    #[error("Failed to create {resource_type}: {reason:#}")]
    CreationFailed {
        resource_type: ResourceType,
        reason: anyhow::Error,
    },

    #[error("{resource_type} '{id}' disappeared before it became ready")]
    ResourceVanished {
        resource_type: ResourceType,
        id: String,
    },

    #[error(
        "{resource_type} '{id}' did not become ready within {}s (last status: {})",
        .timeout.as_secs(),
        .last_status.as_deref().unwrap_or("unknown")
    )]
    ReadinessTimeout {
        resource_type: ResourceType,
        id: String,
        timeout: Duration,
        last_status: Option<String>,
    },

    #[error("{resource_type} '{id}' entered status '{status}' while waiting to become ready")]
    ResourceFailed {
        resource_type: ResourceType,
        id: String,
        status: String,
    },

    #[error("Provider error: {0}")]
    Provider(#[from] CloudError),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = TrackerError::ReadinessTimeout {
            resource_type: ResourceType::Volumes,
            id: "vol-1".into(),
            timeout: Duration::from_secs(90),
            last_status: Some("creating".into()),
        };
        assert_eq!(
            err.to_string(),
            "volumes 'vol-1' did not become ready within 90s (last status: creating)"
        );
    }

    #[test]
    fn test_creation_failure_keeps_context_chain() {
        let reason = anyhow::anyhow!("quota exceeded").context("openstack server create");
        let err = TrackerError::CreationFailed {
            resource_type: ResourceType::Servers,
            reason,
        };
        assert_eq!(
            err.to_string(),
            "Failed to create servers: openstack server create: quota exceeded"
        );
    }
}
