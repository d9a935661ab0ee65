//! openstack CLI wrapper
//!
//! Wraps `openstack <noun> show|delete` for the resource kinds the validator
//! tracks.

use crate::error::{OpenStackError, Result};
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;
use validator_cloud::{ResourceState, ResourceType};
use validator_config::OpenStackSettings;

/// openstack CLI wrapper
pub struct OpenStackCli {
    program: String,
    cloud: Option<String>,
    region: Option<String>,
}

impl OpenStackCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cloud: None,
            region: None,
        }
    }

    pub fn from_settings(settings: &OpenStackSettings) -> Self {
        Self {
            program: settings.cli.clone(),
            cloud: settings.cloud.clone(),
            region: settings.region.clone(),
        }
    }

    /// Global options placed before the subcommand
    fn global_args(&self) -> Vec<&str> {
        let mut args = Vec::new();
        if let Some(cloud) = &self.cloud {
            args.push("--os-cloud");
            args.push(cloud.as_str());
        }
        if let Some(region) = &self.region {
            args.push("--os-region-name");
            args.push(region.as_str());
        }
        args
    }

    /// Run an openstack command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let global = self.global_args();
        let mut cmd = Command::new(&self.program);
        cmd.args(&global);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {} {}", self.program, global.join(" "), args.join(" "));

        let output = cmd.output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OpenStackError::CliNotFound(self.program.clone()),
            _ => OpenStackError::IoError(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if is_not_found(&stderr) {
                return Err(OpenStackError::NotFound(stderr));
            }
            return Err(OpenStackError::CommandFailed(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// `openstack <noun> show <id> -f json`
    pub async fn show(&self, resource_type: ResourceType, id: &str) -> Result<ResourceState> {
        let mut args: Vec<&str> = noun(resource_type).to_vec();
        args.extend(["show", id, "-f", "json"]);

        let output = self.run_command(&args).await?;
        parse_state(resource_type, id, &output)
    }

    /// `openstack <noun> delete <id>`
    pub async fn delete(&self, resource_type: ResourceType, id: &str) -> Result<()> {
        let mut args: Vec<&str> = noun(resource_type).to_vec();
        args.extend(["delete", id]);

        self.run_command(&args).await?;
        Ok(())
    }
}

/// CLI noun for a resource type
pub fn noun(resource_type: ResourceType) -> &'static [&'static str] {
    match resource_type {
        ResourceType::Flavors => &["flavor"],
        ResourceType::KeyPairs => &["keypair"],
        ResourceType::Servers => &["server"],
        ResourceType::Networks => &["network"],
        ResourceType::Ports => &["port"],
        ResourceType::Subnets => &["subnet"],
        ResourceType::FloatingIps => &["floating", "ip"],
        ResourceType::Routers => &["router"],
        ResourceType::SecurityGroups => &["security", "group"],
        ResourceType::SecurityGroupRules => &["security", "group", "rule"],
        ResourceType::Images => &["image"],
        ResourceType::Volumes => &["volume"],
        ResourceType::Snapshots => &["volume", "snapshot"],
    }
}

/// Status at which the provider considers a resource ready; `None` for
/// kinds without a lifecycle status
fn ready_status(resource_type: ResourceType) -> Option<&'static str> {
    match resource_type {
        ResourceType::Servers
        | ResourceType::Networks
        | ResourceType::Ports
        | ResourceType::Routers => Some("ACTIVE"),
        ResourceType::Volumes | ResourceType::Snapshots => Some("available"),
        ResourceType::Images => Some("active"),
        _ => None,
    }
}

/// Whether CLI error output means the resource does not exist
pub fn is_not_found(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("could not be found")
        || lower.contains("http 404")
        || (lower.starts_with("no ") && (lower.contains(" found for ") || lower.contains(" exists")))
}

/// Build a resource state from `show -f json` output
pub fn parse_state(resource_type: ResourceType, id: &str, output: &str) -> Result<ResourceState> {
    let value: Value = serde_json::from_str(output)?;
    let Value::Object(fields) = value else {
        return Err(OpenStackError::UnexpectedOutput(format!(
            "expected a JSON object for {} '{}'",
            resource_type, id
        )));
    };

    // key pairs are addressed by name and may not carry an id
    let resource_id = fields
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or(id)
        .to_string();
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let status = fields
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string);

    let ready = match ready_status(resource_type) {
        Some(expected) => status.as_deref() == Some(expected),
        None => true,
    };

    let mut state = ResourceState::new(resource_id, resource_type)
        .with_name(name)
        .with_ready(ready);
    state.status = status;
    for (key, value) in fields {
        if !matches!(key.as_str(), "id" | "name" | "status") {
            state = state.with_attribute(key, value);
        }
    }

    Ok(state)
}
