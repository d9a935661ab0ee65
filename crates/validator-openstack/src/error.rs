//! OpenStack provider error types

use thiserror::Error;
use validator_cloud::CloudError;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("openstack CLI not found ({0}). Please install python-openstackclient")]
    CliNotFound(String),

    #[error("openstack command failed: {0}")]
    CommandFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unexpected CLI output: {0}")]
    UnexpectedOutput(String),

    #[error("CPI is not configured: {0}")]
    CpiNotConfigured(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<OpenStackError> for CloudError {
    fn from(err: OpenStackError) -> Self {
        match err {
            OpenStackError::NotFound(id) => CloudError::ResourceNotFound(id),
            OpenStackError::CliNotFound(_) | OpenStackError::CommandFailed(_) => {
                CloudError::CommandFailed(err.to_string())
            }
            OpenStackError::JsonError(e) => CloudError::Json(e),
            OpenStackError::IoError(e) => CloudError::Io(e),
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpenStackError>;
