use chrono::Utc;
use tracing::{debug, info};

use super::reconcile::{backfill_positions, reconcile_workflow};
use crate::config::LayoutConfig;
use crate::layout::{apply_auto_layout, can_auto_layout};
use crate::workflow::{CanvasLayout, EntityModel, UIWorkflowData, WorkflowConfiguration};

/// Wraps a bare configuration (no layout) into a new workflow with every
/// state placed on the default grid.
pub fn import_configuration(configuration: WorkflowConfiguration) -> UIWorkflowData {
    let now = Utc::now();
    let mut layout = CanvasLayout::empty(now);
    backfill_positions(&mut layout, &configuration);
    info!(
        workflow = %configuration.name,
        states = configuration.states.len(),
        "imported workflow configuration"
    );
    UIWorkflowData {
        id: uuid::Uuid::new_v4().to_string(),
        entity_model: EntityModel::default(),
        configuration,
        layout,
        created_at: now,
        updated_at: now,
    }
}

/// Same as [`import_configuration`], then runs auto-layout when possible.
pub fn import_configuration_with_layout(
    configuration: WorkflowConfiguration,
    config: &LayoutConfig,
) -> UIWorkflowData {
    let imported = import_configuration(configuration);
    if can_auto_layout(&imported) {
        apply_auto_layout(&imported, config)
    } else {
        imported
    }
}

/// Replaces the configuration of `workflow`, e.g. after a JSON edit. Layout
/// entries still valid under the new configuration are kept and new states
/// get grid positions, unless `reset_layout` asks for a fresh layout.
pub fn apply_configuration(
    workflow: &UIWorkflowData,
    configuration: WorkflowConfiguration,
    reset_layout: bool,
) -> UIWorkflowData {
    let mut next = workflow.clone();
    next.configuration = configuration;
    if reset_layout {
        debug!(workflow = %next.id, "discarding layout on configuration apply");
        next.layout.states.clear();
        next.layout.transitions.clear();
    }
    let mut next = reconcile_workflow(&next);
    let now = Utc::now();
    next.layout.touch(now);
    next.stamp(now);
    next
}
