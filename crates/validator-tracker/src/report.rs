//! Cleanup results

use serde::Serialize;
use validator_cloud::ResourceType;

/// What happened to one tracked resource during cleanup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "error")]
pub enum CleanupOutcome {
    /// Destroy step succeeded
    Destroyed,
    /// No longer present on the provider; nothing to destroy
    AlreadyGone,
    /// Destroy step failed
    Failed(String),
}

impl std::fmt::Display for CleanupOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupOutcome::Destroyed => write!(f, "destroyed"),
            CleanupOutcome::AlreadyGone => write!(f, "already gone"),
            CleanupOutcome::Failed(error) => write!(f, "failed: {}", error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupEntry {
    pub resource_type: ResourceType,
    pub provider_id: String,
    pub display_name: String,
    pub origin_label: String,
    pub outcome: CleanupOutcome,
}

/// Per-resource cleanup results, in the order they were attempted
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub entries: Vec<CleanupEntry>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl CleanupReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True unless a destroy step failed
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn push(&mut self, entry: CleanupEntry) {
        self.entries.push(entry);
    }

    pub fn failures(&self) -> impl Iterator<Item = &CleanupEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, CleanupOutcome::Failed(_)))
    }

    /// Number of destroy steps that were actually run
    pub fn attempted(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome != CleanupOutcome::AlreadyGone)
            .count()
    }

    /// Append another report, e.g. from the next tracker in a run
    pub fn merge(&mut self, other: CleanupReport) {
        self.entries.extend(other.entries);
        self.duration_ms += other.duration_ms;
    }

    pub fn summary(&self) -> CleanupSummary {
        let mut summary = CleanupSummary::default();
        for entry in &self.entries {
            match entry.outcome {
                CleanupOutcome::Destroyed => summary.destroyed += 1,
                CleanupOutcome::AlreadyGone => summary.already_gone += 1,
                CleanupOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Emit one log line per resource
    pub fn log(&self) {
        for entry in &self.entries {
            match entry.outcome {
                CleanupOutcome::Failed(_) => tracing::warn!(
                    "{} '{}' ({}) from '{}': {}",
                    entry.resource_type,
                    entry.provider_id,
                    entry.display_name,
                    entry.origin_label,
                    entry.outcome
                ),
                _ => tracing::info!(
                    "{} '{}' ({}): {}",
                    entry.resource_type,
                    entry.provider_id,
                    entry.display_name,
                    entry.outcome
                ),
            }
        }
        tracing::info!("Cleanup: {}", self.summary());
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub destroyed: usize,
    pub failed: usize,
    pub already_gone: usize,
}

impl std::fmt::Display for CleanupSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} destroyed, {} failed, {} already gone",
            self.destroyed, self.failed, self.already_gone
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, outcome: CleanupOutcome) -> CleanupEntry {
        CleanupEntry {
            resource_type: ResourceType::Volumes,
            provider_id: id.to_string(),
            display_name: String::new(),
            origin_label: "Validator attaches a disk".to_string(),
            outcome,
        }
    }

    #[test]
    fn test_empty_report_is_success() {
        let report = CleanupReport::new();
        assert!(report.is_success());
        assert_eq!(report.attempted(), 0);
        assert_eq!(report.summary().to_string(), "0 destroyed, 0 failed, 0 already gone");
    }

    #[test]
    fn test_failure_makes_report_unsuccessful() {
        let mut report = CleanupReport::new();
        report.push(entry("vol-1", CleanupOutcome::Failed("in-use".into())));
        report.push(entry("vol-2", CleanupOutcome::Destroyed));
        report.push(entry("vol-3", CleanupOutcome::AlreadyGone));

        assert!(!report.is_success());
        assert_eq!(report.attempted(), 2);
        let failed: Vec<_> = report.failures().map(|e| e.provider_id.as_str()).collect();
        assert_eq!(failed, vec!["vol-1"]);
    }

    #[test]
    fn test_merge() {
        let mut first = CleanupReport::new();
        first.push(entry("vol-1", CleanupOutcome::Destroyed));
        first.duration_ms = 10;

        let mut second = CleanupReport::new();
        second.push(entry("vol-2", CleanupOutcome::Failed("timeout".into())));
        second.duration_ms = 5;

        first.merge(second);
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.duration_ms, 15);
        assert_eq!(
            first.summary(),
            CleanupSummary {
                destroyed: 1,
                failed: 1,
                already_gone: 0
            }
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(CleanupOutcome::Failed("busy".into())).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "failed", "error": "busy"}));

        let json = serde_json::to_value(CleanupOutcome::Destroyed).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "destroyed"}));
    }
}
