//! Core of a workflow (finite-state-machine) canvas editor.
//!
//! A [`workflow::WorkflowConfiguration`] is the authoritative definition; a
//! [`workflow::CanvasLayout`] is a disposable visual overlay keyed by state
//! ids and positional transition ids ([`identity`]). The [`model`] module
//! keeps the two in sync and derives renderer-ready records, [`layout`]
//! computes automatic positions, and [`history`] provides per-workflow
//! undo/redo.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod identity;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod validation;
pub mod workflow;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, HistoryConfig, LayoutConfig, load_config};
pub use error::{ValidationIssue, WorkflowError};
pub use history::HistoryService;
pub use layout::{AutoLayout, apply_auto_layout, can_auto_layout, compute_auto_layout};
pub use model::{WorkflowView, cleanup_workflow_state, derive_view};
pub use validation::{parse_configuration, validate_configuration};
pub use workflow::{
    CanvasLayout, Position, StateDefinition, TransitionDefinition, UIWorkflowData,
    WorkflowConfiguration,
};
