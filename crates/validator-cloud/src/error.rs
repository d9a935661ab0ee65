//! Cloud provider and CPI error types

use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::ResourceNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Errors reported by the deployment tool's cloud interface
#[derive(Error, Debug)]
pub enum CpiError {
    /// The CPI reported a cloud error for the requested operation
    #[error("CPI cloud error: {message}")]
    Cloud { message: String },

    /// Any other error type raised inside the CPI
    #[error("CPI error {error_type}: {message}")]
    Other { error_type: String, message: String },

    #[error("CPI invocation failed: {0}")]
    Invocation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CpiError {
    pub fn is_cloud_error(&self) -> bool {
        matches!(self, CpiError::Cloud { .. })
    }
}
