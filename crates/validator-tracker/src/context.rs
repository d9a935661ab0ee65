//! Test framework collaborator
//!
//! The tracker never looks up "the current test" on its own; whoever runs
//! the suite hands it a [`TestContext`].

use std::sync::{Mutex, PoisonError};

pub trait TestContext: Send + Sync {
    /// Full description of the test that is currently running
    fn current_test(&self) -> String;

    /// Mark the current test as skipped
    fn mark_skipped(&self, message: &str);
}

/// Returned by `consumes` when the requested resource was never produced.
/// The current test has already been marked skipped when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub message: String,
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "skipped: {}", self.message)
    }
}

/// Context with a fixed, settable test label that remembers skip messages
#[derive(Debug, Default)]
pub struct FixedContext {
    label: Mutex<String>,
    skipped: Mutex<Vec<String>>,
}

impl FixedContext {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Mutex::new(label.into()),
            skipped: Mutex::new(Vec::new()),
        }
    }

    /// Switch to the next test
    pub fn set_current(&self, label: impl Into<String>) {
        *self.label.lock().unwrap_or_else(PoisonError::into_inner) = label.into();
    }

    /// Skip messages recorded so far, oldest first
    pub fn skipped(&self) -> Vec<String> {
        self.skipped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TestContext for FixedContext {
    fn current_test(&self) -> String {
        self.label
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn mark_skipped(&self, message: &str) {
        tracing::warn!("Skipping '{}': {}", self.current_test(), message);
        self.skipped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
