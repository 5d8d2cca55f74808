//! Editing operations. Every function takes the current workflow and returns
//! a new one; the input is never mutated. Operations addressing a state or
//! transition that no longer exists log a warning and return an unchanged
//! copy, since they are usually stale UI events racing a fast edit.

use chrono::Utc;
use tracing::warn;

use super::reconcile::{
    cleanup_workflow_state, next_free_grid_position, remap_state_transitions, rename_layout_state,
};
use crate::identity::{generate_transition_id, parse_transition_id, validate_transition_exists};
use crate::workflow::{
    LayoutStateEntry, LayoutTransitionEntry, Position, StateDefinition, TransitionDefinition,
    UIWorkflowData,
};

/// Field-level edits for a single transition. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct TransitionPatch {
    pub name: Option<String>,
    pub manual: Option<bool>,
    pub disabled: Option<bool>,
    pub criterion: Option<serde_json::Value>,
    pub processors: Option<Vec<serde_json::Value>>,
}

fn commit(workflow: &mut UIWorkflowData) {
    let now = Utc::now();
    workflow.layout.touch(now);
    workflow.stamp(now);
}

fn state_id_taken(workflow: &UIWorkflowData, id: &str) -> bool {
    workflow.configuration.states.contains_key(id)
        || workflow.layout.states.iter().any(|entry| entry.id == id)
}

/// Returns `base` if unused, else the first free `base_<n>`. Residual layout
/// ids count as taken so a new state never inherits a stale position.
pub fn unique_state_id(workflow: &UIWorkflowData, base: &str) -> String {
    let base = if base.trim().is_empty() { "state" } else { base.trim() };
    if !state_id_taken(workflow, base) {
        return base.to_string();
    }
    (1usize..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !state_id_taken(workflow, candidate))
        .unwrap_or_else(|| base.to_string())
}

pub fn add_state(
    workflow: &UIWorkflowData,
    requested_id: &str,
    position: Option<Position>,
) -> (UIWorkflowData, String) {
    let mut next = workflow.clone();
    let id = unique_state_id(workflow, requested_id);

    next.configuration
        .states
        .insert(id.clone(), StateDefinition::default());
    if next.configuration.states.len() == 1 {
        next.configuration.initial_state = id.clone();
    }

    let position = position.unwrap_or_else(|| {
        let mut slot = next.configuration.states.len() - 1;
        next_free_grid_position(&next.layout, &mut slot)
    });
    next.layout.states.push(LayoutStateEntry {
        id: id.clone(),
        position,
        properties: None,
    });
    commit(&mut next);
    (next, id)
}

pub fn rename_state(workflow: &UIWorkflowData, old_id: &str, new_id: &str) -> UIWorkflowData {
    let new_id = new_id.trim();
    if old_id == new_id {
        return workflow.clone();
    }
    if !workflow.configuration.states.contains_key(old_id) {
        warn!(state = old_id, "rename ignored: state does not exist");
        return workflow.clone();
    }
    if new_id.is_empty() || workflow.configuration.states.contains_key(new_id) {
        warn!(state = old_id, new_id, "rename ignored: target id is empty or taken");
        return workflow.clone();
    }

    // `new_id` is not a state yet, so cleanup drops every residual entry keyed
    // by it before the live entries are re-keyed onto the same ids.
    let mut next = cleanup_workflow_state(workflow);
    let config = &mut next.configuration;
    config.states = std::mem::take(&mut config.states)
        .into_iter()
        .map(|(id, state)| {
            if id == old_id {
                (new_id.to_string(), state)
            } else {
                (id, state)
            }
        })
        .collect();
    for state in config.states.values_mut() {
        for transition in &mut state.transitions {
            if transition.next == old_id {
                transition.next = new_id.to_string();
            }
        }
    }
    if config.initial_state == old_id {
        config.initial_state = new_id.to_string();
    }

    rename_layout_state(&mut next.layout, old_id, new_id);
    commit(&mut next);
    next
}

pub fn delete_state(workflow: &UIWorkflowData, state_id: &str) -> UIWorkflowData {
    if !workflow.configuration.states.contains_key(state_id) {
        warn!(state = state_id, "delete ignored: state does not exist");
        return workflow.clone();
    }

    let mut next = workflow.clone();
    let UIWorkflowData {
        configuration,
        layout,
        ..
    } = &mut next;
    configuration.states.shift_remove(state_id);

    for (source_id, state) in configuration.states.iter_mut() {
        if !state.transitions.iter().any(|t| t.next == state_id) {
            continue;
        }
        let mut mapping = Vec::with_capacity(state.transitions.len());
        let mut kept = Vec::with_capacity(state.transitions.len());
        for transition in state.transitions.drain(..) {
            if transition.next == state_id {
                mapping.push(None);
            } else {
                mapping.push(Some(kept.len()));
                kept.push(transition);
            }
        }
        state.transitions = kept;
        remap_state_transitions(layout, source_id, &mapping);
    }

    if configuration.initial_state == state_id {
        configuration.initial_state = configuration.states.keys().next().cloned().unwrap_or_default();
    }

    let mut next = cleanup_workflow_state(&next);
    commit(&mut next);
    next
}

pub fn set_initial_state(workflow: &UIWorkflowData, state_id: &str) -> UIWorkflowData {
    if !workflow.configuration.states.contains_key(state_id) {
        warn!(state = state_id, "initial state unchanged: state does not exist");
        return workflow.clone();
    }
    let mut next = workflow.clone();
    next.configuration.initial_state = state_id.to_string();
    commit(&mut next);
    next
}

/// Appends a transition from `source` to `target` and returns its id.
pub fn add_transition(
    workflow: &UIWorkflowData,
    source: &str,
    target: &str,
    name: Option<&str>,
    manual: bool,
) -> (UIWorkflowData, Option<String>) {
    let states = &workflow.configuration.states;
    if !states.contains_key(source) || !states.contains_key(target) {
        warn!(source, target, "connect ignored: unknown source or target state");
        return (workflow.clone(), None);
    }

    let mut next = workflow.clone();
    let state = &mut next.configuration.states[source];
    let base = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{source}_to_{target}"));
    let name = unique_transition_name(state, &base);
    state
        .transitions
        .push(TransitionDefinition::new(name, target, manual));
    let id = generate_transition_id(source, state.transitions.len() - 1);

    // A stale entry may still sit under the freshly derived id.
    next.layout.transitions.retain(|entry| entry.id != id);
    commit(&mut next);
    (next, Some(id))
}

fn unique_transition_name(state: &StateDefinition, base: &str) -> String {
    let taken = |candidate: &str| state.transitions.iter().any(|t| t.name == candidate);
    if !taken(base) {
        return base.to_string();
    }
    (2usize..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Resolves `transition_id` against the current configuration. The index
/// always comes from the id being handled now, never from a cached value.
fn resolve(workflow: &UIWorkflowData, transition_id: &str) -> Option<(String, usize)> {
    if !validate_transition_exists(transition_id, &workflow.configuration.states) {
        return None;
    }
    parse_transition_id(transition_id).map(|r| (r.source_state_id, r.transition_index))
}

pub fn delete_transition(workflow: &UIWorkflowData, transition_id: &str) -> UIWorkflowData {
    let Some((source, index)) = resolve(workflow, transition_id) else {
        warn!(transition = transition_id, "delete ignored: transition does not exist");
        return workflow.clone();
    };

    let mut next = workflow.clone();
    let transitions = &mut next.configuration.states[source.as_str()].transitions;
    let len = transitions.len();
    transitions.remove(index);

    let mapping: Vec<Option<usize>> = (0..len)
        .map(|old| match old.cmp(&index) {
            std::cmp::Ordering::Less => Some(old),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(old - 1),
        })
        .collect();
    remap_state_transitions(&mut next.layout, &source, &mapping);
    commit(&mut next);
    next
}

/// Moves a transition to `new_index` within its state's array (clamped).
/// Returns the workflow and the transition's new id.
pub fn reorder_transition(
    workflow: &UIWorkflowData,
    transition_id: &str,
    new_index: usize,
) -> (UIWorkflowData, Option<String>) {
    let Some((source, index)) = resolve(workflow, transition_id) else {
        warn!(transition = transition_id, "reorder ignored: transition does not exist");
        return (workflow.clone(), None);
    };

    let mut next = workflow.clone();
    let transitions = &mut next.configuration.states[source.as_str()].transitions;
    let len = transitions.len();
    let new_index = new_index.min(len - 1);
    if new_index == index {
        return (next, Some(transition_id.to_string()));
    }

    let moved = transitions.remove(index);
    transitions.insert(new_index, moved);

    let mut order: Vec<usize> = (0..len).collect();
    let old = order.remove(index);
    order.insert(new_index, old);
    let mut mapping = vec![None; len];
    for (new_pos, old_pos) in order.into_iter().enumerate() {
        mapping[old_pos] = Some(new_pos);
    }
    remap_state_transitions(&mut next.layout, &source, &mapping);
    commit(&mut next);
    (next, Some(generate_transition_id(&source, new_index)))
}

/// Points an existing transition at a different target state.
pub fn retarget_transition(
    workflow: &UIWorkflowData,
    transition_id: &str,
    target: &str,
) -> UIWorkflowData {
    let Some((source, index)) = resolve(workflow, transition_id) else {
        warn!(transition = transition_id, "reconnect ignored: transition does not exist");
        return workflow.clone();
    };
    if !workflow.configuration.states.contains_key(target) {
        warn!(transition = transition_id, target, "reconnect ignored: unknown target");
        return workflow.clone();
    }
    let mut next = workflow.clone();
    next.configuration.states[source.as_str()].transitions[index].next = target.to_string();
    commit(&mut next);
    next
}

pub fn update_transition(
    workflow: &UIWorkflowData,
    transition_id: &str,
    patch: TransitionPatch,
) -> UIWorkflowData {
    let Some((source, index)) = resolve(workflow, transition_id) else {
        warn!(transition = transition_id, "update ignored: transition does not exist");
        return workflow.clone();
    };
    let mut next = workflow.clone();
    let transition = &mut next.configuration.states[source.as_str()].transitions[index];
    if let Some(name) = patch.name {
        transition.name = name;
    }
    if let Some(manual) = patch.manual {
        transition.manual = manual;
    }
    if let Some(disabled) = patch.disabled {
        transition.disabled = Some(disabled);
    }
    if let Some(criterion) = patch.criterion {
        transition.criterion = Some(criterion);
    }
    if let Some(processors) = patch.processors {
        transition.processors = Some(processors);
    }
    commit(&mut next);
    next
}

pub fn move_state(workflow: &UIWorkflowData, state_id: &str, position: Position) -> UIWorkflowData {
    if !workflow.configuration.states.contains_key(state_id) {
        warn!(state = state_id, "move ignored: state does not exist");
        return workflow.clone();
    }
    let mut next = workflow.clone();
    match next.layout.states.iter_mut().find(|e| e.id == state_id) {
        Some(entry) => entry.position = position,
        None => next.layout.states.push(LayoutStateEntry {
            id: state_id.to_string(),
            position,
            properties: None,
        }),
    }
    commit(&mut next);
    next
}

fn edit_transition_layout(
    workflow: &UIWorkflowData,
    transition_id: &str,
    action: &str,
    apply: impl FnOnce(&mut LayoutTransitionEntry),
) -> UIWorkflowData {
    if !validate_transition_exists(transition_id, &workflow.configuration.states) {
        warn!(transition = transition_id, action, "layout edit ignored: transition does not exist");
        return workflow.clone();
    }
    let mut next = workflow.clone();
    let transitions = &mut next.layout.transitions;
    let entry = match transitions.iter().position(|e| e.id == transition_id) {
        Some(idx) => &mut transitions[idx],
        None => {
            transitions.push(LayoutTransitionEntry::new(transition_id));
            let last = transitions.len() - 1;
            &mut transitions[last]
        }
    };
    apply(entry);
    commit(&mut next);
    next
}

pub fn move_transition_node(
    workflow: &UIWorkflowData,
    transition_id: &str,
    position: Position,
) -> UIWorkflowData {
    edit_transition_layout(workflow, transition_id, "move node", |entry| {
        entry.position = Some(position);
    })
}

pub fn move_transition_label(
    workflow: &UIWorkflowData,
    transition_id: &str,
    offset: Position,
) -> UIWorkflowData {
    edit_transition_layout(workflow, transition_id, "move label", |entry| {
        entry.label_position = Some(offset);
    })
}

pub fn set_transition_handles(
    workflow: &UIWorkflowData,
    transition_id: &str,
    source_handle: Option<String>,
    target_handle: Option<String>,
) -> UIWorkflowData {
    edit_transition_layout(workflow, transition_id, "set handles", |entry| {
        entry.source_handle = source_handle;
        entry.target_handle = target_handle;
        entry.segment_handles.clear();
    })
}
