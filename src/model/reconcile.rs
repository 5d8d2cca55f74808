use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;

use super::types::grid_position;
use crate::identity::{
    generate_layout_transition_id, generate_transition_id, migrate_layout_transition_id,
    parse_layout_transition_id, parse_transition_id, validate_transition_exists,
};
use crate::workflow::{
    CanvasLayout, LayoutStateEntry, Position, UIWorkflowData, WorkflowConfiguration,
};

/// Drops layout entries that no longer resolve against the configuration.
///
/// Canonical transition entries must point at an in-range transition; legacy
/// source→target entries survive while both states exist. Anything else is
/// dropped. Never touches the configuration or the timestamps, and
/// `cleanup(cleanup(w)) == cleanup(w)`.
pub fn cleanup_workflow_state(workflow: &UIWorkflowData) -> UIWorkflowData {
    let mut next = workflow.clone();
    let states = &next.configuration.states;

    let before_states = next.layout.states.len();
    let before_transitions = next.layout.transitions.len();

    next.layout.states.retain(|entry| states.contains_key(&entry.id));
    next.layout
        .transitions
        .retain(|entry| layout_transition_is_live(&entry.id, &next.configuration));

    let pruned_states = before_states - next.layout.states.len();
    let pruned_transitions = before_transitions - next.layout.transitions.len();
    if pruned_states > 0 || pruned_transitions > 0 {
        debug!(
            workflow = %workflow.id,
            pruned_states,
            pruned_transitions,
            "pruned stale layout entries"
        );
    }
    next
}

fn layout_transition_is_live(id: &str, configuration: &WorkflowConfiguration) -> bool {
    if parse_transition_id(id).is_some() {
        return validate_transition_exists(id, &configuration.states);
    }
    match parse_layout_transition_id(id) {
        Some(legacy) => {
            configuration.states.contains_key(&legacy.source_state_id)
                && configuration.states.contains_key(&legacy.target_state_id)
        }
        None => false,
    }
}

/// Cleanup plus a default-grid position for every state missing one.
pub fn reconcile_workflow(workflow: &UIWorkflowData) -> UIWorkflowData {
    let mut next = cleanup_workflow_state(workflow);
    let added = backfill_positions(&mut next.layout, &next.configuration);
    if added > 0 {
        debug!(workflow = %next.id, added, "backfilled missing state positions");
        let now = Utc::now();
        next.layout.touch(now);
        next.stamp(now);
    }
    next
}

/// Appends grid positions for states without a layout entry, skipping grid
/// slots that are already occupied. Returns the number of entries added.
pub(crate) fn backfill_positions(
    layout: &mut CanvasLayout,
    configuration: &WorkflowConfiguration,
) -> usize {
    let placed: HashSet<String> = layout.states.iter().map(|e| e.id.clone()).collect();
    let missing: Vec<String> = configuration
        .states
        .keys()
        .filter(|id| !placed.contains(*id))
        .cloned()
        .collect();

    let mut slot = 0usize;
    for id in &missing {
        let position = next_free_grid_position(layout, &mut slot);
        layout.states.push(LayoutStateEntry {
            id: id.clone(),
            position,
            properties: None,
        });
    }
    missing.len()
}

/// First default-grid position at or after `*slot` that no state occupies.
/// Advances `*slot` past the returned position.
pub(crate) fn next_free_grid_position(layout: &CanvasLayout, slot: &mut usize) -> Position {
    loop {
        let candidate = grid_position(*slot);
        *slot += 1;
        let occupied = layout
            .states
            .iter()
            .any(|entry| entry.position.distance_to(&candidate) < 1.0);
        if !occupied {
            return candidate;
        }
    }
}

/// Rewrites resolvable legacy transition ids to canonical ids. When both a
/// legacy and a canonical entry exist for the same transition the canonical
/// entry wins and the legacy one is dropped.
pub fn migrate_layout(workflow: &UIWorkflowData) -> UIWorkflowData {
    let mut next = workflow.clone();
    let states = &next.configuration.states;

    let mut taken: HashSet<String> = next
        .layout
        .transitions
        .iter()
        .filter(|entry| parse_transition_id(&entry.id).is_some())
        .map(|entry| entry.id.clone())
        .collect();

    let mut migrated = 0usize;
    let mut transitions = Vec::with_capacity(next.layout.transitions.len());
    for mut entry in next.layout.transitions.drain(..) {
        if parse_transition_id(&entry.id).is_none() {
            if let Some(canonical) = migrate_layout_transition_id(&entry.id, states) {
                if !taken.insert(canonical.clone()) {
                    continue;
                }
                entry.id = canonical;
                migrated += 1;
            }
        }
        transitions.push(entry);
    }
    next.layout.transitions = transitions;

    if migrated > 0 {
        debug!(workflow = %next.id, migrated, "migrated legacy layout transition ids");
        let now = Utc::now();
        next.layout.touch(now);
        next.stamp(now);
    }
    next
}

/// Re-keys canonical layout entries of `state_id` after its transition array
/// was spliced. `mapping[old] = Some(new)` keeps an entry under its new index;
/// `None` or an out-of-range old index drops it.
pub(crate) fn remap_state_transitions(
    layout: &mut CanvasLayout,
    state_id: &str,
    mapping: &[Option<usize>],
) {
    layout.transitions.retain_mut(|entry| {
        let Some(parsed) = parse_transition_id(&entry.id) else {
            return true;
        };
        if parsed.source_state_id != state_id {
            return true;
        }
        match mapping.get(parsed.transition_index).copied().flatten() {
            Some(new_index) => {
                entry.id = generate_transition_id(state_id, new_index);
                true
            }
            None => false,
        }
    });
}

/// Moves every layout entry keyed by `old_id` over to `new_id`.
pub(crate) fn rename_layout_state(layout: &mut CanvasLayout, old_id: &str, new_id: &str) {
    for entry in &mut layout.states {
        if entry.id == old_id {
            entry.id = new_id.to_string();
        }
    }
    for entry in &mut layout.transitions {
        if let Some(parsed) = parse_transition_id(&entry.id) {
            if parsed.source_state_id == old_id {
                entry.id = generate_transition_id(new_id, parsed.transition_index);
            }
        } else if let Some(legacy) = parse_layout_transition_id(&entry.id) {
            let source = if legacy.source_state_id == old_id {
                new_id
            } else {
                legacy.source_state_id.as_str()
            };
            let target = if legacy.target_state_id == old_id {
                new_id
            } else {
                legacy.target_state_id.as_str()
            };
            entry.id = generate_layout_transition_id(source, target);
        }
    }
}
