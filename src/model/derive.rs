use std::collections::HashMap;

use super::reconcile::cleanup_workflow_state;
use super::types::{DEFAULT_STATE_POSITION, UIStateData, UITransitionData, WorkflowView};
use crate::identity::{generate_layout_transition_id, generate_transition_id};
use crate::workflow::{LayoutTransitionEntry, UIWorkflowData};

pub fn derive_transitions(workflow: &UIWorkflowData) -> Vec<UITransitionData> {
    let entries: HashMap<&str, &LayoutTransitionEntry> = workflow
        .layout
        .transitions
        .iter()
        .map(|entry| (entry.id.as_str(), entry))
        .collect();

    let mut transitions = Vec::with_capacity(workflow.configuration.transition_count());
    for (state_id, state) in &workflow.configuration.states {
        for (index, definition) in state.transitions.iter().enumerate() {
            let id = generate_transition_id(state_id, index);
            let entry = entries.get(id.as_str()).copied().or_else(|| {
                let legacy = generate_layout_transition_id(state_id, &definition.next);
                entries.get(legacy.as_str()).copied()
            });
            transitions.push(build_transition(
                id,
                state_id,
                index,
                definition.clone(),
                entry,
            ));
        }
    }
    transitions
}

fn build_transition(
    id: String,
    state_id: &str,
    index: usize,
    definition: crate::workflow::TransitionDefinition,
    entry: Option<&LayoutTransitionEntry>,
) -> UITransitionData {
    let legacy_handles = entry.and_then(|e| e.segment_handles.values().next());
    UITransitionData {
        is_self_loop: definition.next == state_id,
        source_state_id: state_id.to_string(),
        target_state_id: definition.next.clone(),
        transition_index: index,
        position: entry.and_then(|e| e.position),
        label_position: entry.and_then(|e| e.label_position),
        source_handle: entry
            .and_then(|e| e.source_handle.clone())
            .or_else(|| legacy_handles.and_then(|h| h.source_handle.clone())),
        target_handle: entry
            .and_then(|e| e.target_handle.clone())
            .or_else(|| legacy_handles.and_then(|h| h.target_handle.clone())),
        definition,
        id,
    }
}

pub fn derive_states(
    workflow: &UIWorkflowData,
    transitions: &[UITransitionData],
) -> Vec<UIStateData> {
    let config = &workflow.configuration;
    let initial = config.effective_initial_state();

    let mut outgoing: HashMap<&str, Vec<String>> = HashMap::new();
    for transition in transitions {
        outgoing
            .entry(transition.source_state_id.as_str())
            .or_default()
            .push(transition.id.clone());
    }

    config
        .states
        .iter()
        .map(|(state_id, state)| {
            let entry = workflow.layout.states.iter().find(|e| &e.id == state_id);
            UIStateData {
                id: state_id.clone(),
                name: state.name.clone().unwrap_or_else(|| state_id.clone()),
                position: entry.map(|e| e.position).unwrap_or(DEFAULT_STATE_POSITION),
                properties: entry.and_then(|e| e.properties.clone()),
                is_initial: initial == Some(state_id.as_str()),
                is_final: state.transitions.is_empty(),
                transition_ids: outgoing.remove(state_id.as_str()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Reconciles and derives the full view in one step.
pub fn derive_view(workflow: &UIWorkflowData) -> WorkflowView {
    let cleaned = cleanup_workflow_state(workflow);
    let transitions = derive_transitions(&cleaned);
    let states = derive_states(&cleaned, &transitions);
    WorkflowView {
        states,
        transitions,
    }
}
