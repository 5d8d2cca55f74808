mod placement;
mod ranking;
mod relax;
pub(crate) mod types;
pub use types::*;

use placement::assign_positions;
use ranking::assign_levels;
use relax::optimize_positions;

use chrono::Utc;
use indexmap::IndexMap;
use rand::Rng;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::model::cleanup_workflow_state;
use crate::workflow::{LayoutStateEntry, Position, UIWorkflowData, WorkflowConfiguration};

/// Auto-layout needs at least one state.
pub fn can_auto_layout(workflow: &UIWorkflowData) -> bool {
    !workflow.configuration.states.is_empty()
}

pub fn compute_auto_layout(
    configuration: &WorkflowConfiguration,
    config: &LayoutConfig,
) -> AutoLayout {
    let mut rng = rand::rng();
    compute_auto_layout_with_rng(configuration, config, &mut rng)
}

/// Computes a position for every state. Jitter is drawn from `rng`, so a
/// seeded generator gives reproducible output.
pub fn compute_auto_layout_with_rng<R: Rng>(
    configuration: &WorkflowConfiguration,
    config: &LayoutConfig,
    rng: &mut R,
) -> AutoLayout {
    let Some(graph) = StateGraph::build(configuration) else {
        return AutoLayout::default();
    };
    if graph.initial != configuration.initial_state {
        debug!(
            declared = %configuration.initial_state,
            used = %graph.initial,
            "initial state missing, leveling from first state"
        );
    }

    let levels = assign_levels(&graph, config);
    let placed = assign_positions(&graph, &levels, config, rng);

    let mut positions: Vec<Position> = graph
        .ids
        .iter()
        .map(|id| placed.get(id).copied().unwrap_or_default())
        .collect();
    optimize_positions(&mut positions, config);

    let level_count = levels.values().copied().max().map_or(0, |max| max + 1);
    debug!(
        states = graph.ids.len(),
        levels = level_count,
        self_loops = graph.self_loops.len(),
        "computed auto layout"
    );

    let self_loop_states = graph
        .ids
        .iter()
        .filter(|id| graph.self_loops.contains(*id))
        .cloned()
        .collect();
    let levels: IndexMap<String, usize> = graph
        .ids
        .iter()
        .map(|id| (id.clone(), levels.get(id).copied().unwrap_or(0)))
        .collect();
    let positions: IndexMap<String, Position> = graph.ids.into_iter().zip(positions).collect();

    AutoLayout {
        positions,
        levels,
        self_loop_states,
    }
}

pub fn apply_auto_layout(workflow: &UIWorkflowData, config: &LayoutConfig) -> UIWorkflowData {
    let mut rng = rand::rng();
    apply_auto_layout_with_rng(workflow, config, &mut rng)
}

/// Writes auto-layout positions into the workflow's layout. State
/// properties, label offsets and handles survive; free-floating transition
/// node positions are cleared since they were placed against the old layout.
pub fn apply_auto_layout_with_rng<R: Rng>(
    workflow: &UIWorkflowData,
    config: &LayoutConfig,
    rng: &mut R,
) -> UIWorkflowData {
    if !can_auto_layout(workflow) {
        return workflow.clone();
    }
    let mut next = cleanup_workflow_state(workflow);
    let computed = compute_auto_layout_with_rng(&next.configuration, config, rng);

    let previous = std::mem::take(&mut next.layout.states);
    next.layout.states = computed
        .positions
        .iter()
        .map(|(id, position)| LayoutStateEntry {
            id: id.clone(),
            position: *position,
            properties: previous
                .iter()
                .find(|entry| &entry.id == id)
                .and_then(|entry| entry.properties.clone()),
        })
        .collect();
    for entry in &mut next.layout.transitions {
        entry.position = None;
    }

    let now = Utc::now();
    next.layout.touch(now);
    next.stamp(now);
    next
}
