//! Error types for the fallible outer surface: parsing and validation.
//!
//! The editing core itself never fails: stale ids and dangling references are
//! pruned or ignored instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid workflow configuration: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

/// A shape problem in a configuration, reported to whoever produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("configuration has no `states` object")]
    MissingStates,

    #[error("configuration has no `initialState`")]
    MissingInitialState,

    #[error("initial state '{0}' does not exist")]
    UnknownInitialState(String),

    #[error("state id must not be empty")]
    EmptyStateId,

    #[error("state id '{0}' contains the reserved sequence '-transition-'")]
    ReservedSeparator(String),

    #[error("transition {index} of state '{state}' targets unknown state '{target}'")]
    DanglingTarget {
        state: String,
        index: usize,
        target: String,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
