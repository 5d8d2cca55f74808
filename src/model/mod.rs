//! Keeps the workflow configuration authoritative and its canvas layout in
//! sync, and derives the view records a renderer consumes.

mod derive;
mod edit;
mod import;
mod reconcile;
pub(crate) mod types;

pub use derive::{derive_states, derive_transitions, derive_view};
pub use edit::{
    TransitionPatch, add_state, add_transition, delete_state, delete_transition,
    move_state, move_transition_label, move_transition_node, rename_state, reorder_transition,
    retarget_transition, set_initial_state, set_transition_handles, unique_state_id,
    update_transition,
};
pub use import::{apply_configuration, import_configuration, import_configuration_with_layout};
pub use reconcile::{cleanup_workflow_state, migrate_layout, reconcile_workflow};
pub use types::*;
