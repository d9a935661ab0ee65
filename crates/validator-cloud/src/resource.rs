//! Resource kinds and provider-reported resource state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Service namespace a resource type lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Compute,
    Network,
    Image,
    Volume,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Compute => "compute",
            Service::Network => "network",
            Service::Image => "image",
            Service::Volume => "volume",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource kinds the validator knows how to track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Flavors,
    KeyPairs,
    Servers,
    Networks,
    Ports,
    Subnets,
    FloatingIps,
    Routers,
    SecurityGroups,
    SecurityGroupRules,
    Images,
    Volumes,
    Snapshots,
}

impl ResourceType {
    pub const ALL: [ResourceType; 13] = [
        ResourceType::Flavors,
        ResourceType::KeyPairs,
        ResourceType::Servers,
        ResourceType::Networks,
        ResourceType::Ports,
        ResourceType::Subnets,
        ResourceType::FloatingIps,
        ResourceType::Routers,
        ResourceType::SecurityGroups,
        ResourceType::SecurityGroupRules,
        ResourceType::Images,
        ResourceType::Volumes,
        ResourceType::Snapshots,
    ];

    /// Identifier used in test steps and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Flavors => "flavors",
            ResourceType::KeyPairs => "key_pairs",
            ResourceType::Servers => "servers",
            ResourceType::Networks => "networks",
            ResourceType::Ports => "ports",
            ResourceType::Subnets => "subnets",
            ResourceType::FloatingIps => "floating_ips",
            ResourceType::Routers => "routers",
            ResourceType::SecurityGroups => "security_groups",
            ResourceType::SecurityGroupRules => "security_group_rules",
            ResourceType::Images => "images",
            ResourceType::Volumes => "volumes",
            ResourceType::Snapshots => "snapshots",
        }
    }

    /// Parse a type identifier. Accepts the plural form ("servers"), the
    /// singular form ("server") and kebab-case ("key-pairs").
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "flavors" | "flavor" => Some(Self::Flavors),
            "key_pairs" | "key_pair" => Some(Self::KeyPairs),
            "servers" | "server" => Some(Self::Servers),
            "networks" | "network" => Some(Self::Networks),
            "ports" | "port" => Some(Self::Ports),
            "subnets" | "subnet" => Some(Self::Subnets),
            "floating_ips" | "floating_ip" => Some(Self::FloatingIps),
            "routers" | "router" => Some(Self::Routers),
            "security_groups" | "security_group" => Some(Self::SecurityGroups),
            "security_group_rules" | "security_group_rule" => Some(Self::SecurityGroupRules),
            "images" | "image" => Some(Self::Images),
            "volumes" | "volume" => Some(Self::Volumes),
            "snapshots" | "snapshot" => Some(Self::Snapshots),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state of a single resource as reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Provider-assigned resource ID
    pub id: String,

    pub resource_type: ResourceType,

    /// Display name (may be empty)
    pub name: String,

    /// Raw provider status, e.g. "ACTIVE" or "available"
    pub status: Option<String>,

    /// Provider-computed readiness flag
    pub ready: bool,

    /// Remaining provider attributes
    pub attributes: HashMap<String, serde_json::Value>,

    /// When this state was read from the provider
    pub observed_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            id: id.into(),
            resource_type,
            name: String::new(),
            status: None,
            ready: false,
            attributes: HashMap::new(),
            observed_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_ready(mut self, ready: bool) -> Self {
        self.ready = ready;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// True when the provider status equals `expected`
    pub fn status_is(&self, expected: &str) -> bool {
        self.status.as_deref() == Some(expected)
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
