use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Configuration file not found. Looked in:\n\
        - current directory: validator.local.yml, validator.yml\n\
        - ./.validator/ directory\n\
        - ~/.config/openstack-validator/validator.yml\n\
        Set VALIDATOR_CONFIG_PATH to point at a file directly"
    )]
    ConfigFileNotFound,

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
