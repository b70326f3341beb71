//! Tunable workflow rules.

use serde::{Deserialize, Serialize};

/// Width of the persisted title column in characters.
///
/// Configured title limits may not exceed it.
pub const MAX_TITLE_COLUMN_WIDTH: usize = 100;

/// Default title limit, matching the storage column width.
pub const DEFAULT_MAX_TITLE_LENGTH: usize = MAX_TITLE_COLUMN_WIDTH;

/// Rules applied when validating story payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRules {
    /// Maximum title length in characters.
    pub max_title_length: usize,
    /// Whether approving a story requires feedback.
    ///
    /// Rejection, cancellation and rework always require feedback.
    pub require_approval_feedback: bool,
}

impl Default for WorkflowRules {
    fn default() -> Self {
        Self {
            max_title_length: DEFAULT_MAX_TITLE_LENGTH,
            require_approval_feedback: true,
        }
    }
}

impl WorkflowRules {
    /// Relaxed rules that accept approvals without feedback.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            require_approval_feedback: false,
            ..Default::default()
        }
    }
}
