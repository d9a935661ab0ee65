//! Configuration model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Top-level validator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub openstack: OpenStackSettings,

    #[serde(default)]
    pub cpi: CpiSettings,

    #[serde(default)]
    pub readiness: ReadinessConfig,
}

impl ValidatorConfig {
    /// Reject values that parse but cannot drive a run
    pub fn validate(&self) -> Result<()> {
        if self.readiness.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "readiness.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.readiness.initial_delay_ms == 0 {
            return Err(ConfigError::Invalid(
                "readiness.initial_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.readiness.multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "readiness.multiplier must be at least 1.0, got {}",
                self.readiness.multiplier
            )));
        }
        if self.readiness.initial_delay_ms > self.readiness.max_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "readiness.initial_delay_ms ({}) exceeds readiness.max_delay_ms ({})",
                self.readiness.initial_delay_ms, self.readiness.max_delay_ms
            )));
        }
        Ok(())
    }
}

/// Settings for the `openstack` command line client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenStackSettings {
    /// Entry in clouds.yaml (`--os-cloud`)
    #[serde(default)]
    pub cloud: Option<String>,

    /// Region (`--os-region-name`)
    #[serde(default)]
    pub region: Option<String>,

    /// Path or name of the CLI binary
    #[serde(default = "default_cli")]
    pub cli: String,
}

fn default_cli() -> String {
    "openstack".to_string()
}

impl Default for OpenStackSettings {
    fn default() -> Self {
        Self {
            cloud: None,
            region: None,
            cli: default_cli(),
        }
    }
}

/// Settings for the external CPI executable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CpiSettings {
    /// Path to the CPI binary
    #[serde(default)]
    pub bin: Option<PathBuf>,

    /// Director UUID sent in the request context
    #[serde(default)]
    pub director_uuid: Option<String>,
}

/// Readiness wait settings (exponential backoff, bounded by a timeout)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadinessConfig {
    /// Upper bound for a single readiness wait, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay before the first re-poll, in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    /// Cap for the poll delay, in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_timeout_secs() -> u64 {
    1200 // 20 minutes
}
fn default_initial_delay() -> u64 {
    1000
}
fn default_max_delay() -> u64 {
    30000
}
fn default_multiplier() -> f64 {
    2.0
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
        }
    }
}

impl ReadinessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay in milliseconds before poll number `attempt + 1`
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        let delay = self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        (delay as u64).min(self.max_delay_ms)
    }
}
