use rand::Rng;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use super::types::StateGraph;
use crate::config::LayoutConfig;
use crate::workflow::Position;

fn jitter<R: Rng>(rng: &mut R, amplitude: f64) -> f64 {
    // Non-finite amplitudes would make the sampled range invalid.
    if !amplitude.is_finite() || amplitude <= 0.0 {
        return 0.0;
    }
    rng.random_range(-amplitude..=amplitude)
}

/// Sorts the states of one level: terminal first, then initial, then states
/// with a conditional transition, then self-loops, then higher out-degree,
/// id as the final tiebreak. Terminal and initial come from the semantic
/// flags, with the name markers as a fallback.
pub(super) fn order_level(bucket: &mut [String], graph: &StateGraph, config: &LayoutConfig) {
    bucket.sort_by_cached_key(|id| {
        let terminal = graph.finals.contains(id) || config.looks_terminal(id);
        let initial = *id == graph.initial || config.looks_initial(id);
        (
            Reverse(terminal),
            Reverse(initial),
            Reverse(graph.conditional.contains(id)),
            Reverse(graph.self_loops.contains(id)),
            Reverse(graph.out_degree.get(id).copied().unwrap_or(0)),
            id.clone(),
        )
    });
}

/// True if any non-self transition of `id` targets a level at or before its own.
fn has_backward_transition(graph: &StateGraph, levels: &HashMap<String, usize>, id: &str) -> bool {
    let Some(&level) = levels.get(id) else {
        return false;
    };
    graph
        .successors(id)
        .iter()
        .any(|next| levels.get(next).is_some_and(|&target| target <= level))
}

pub(super) fn assign_positions<R: Rng>(
    graph: &StateGraph,
    levels: &HashMap<String, usize>,
    config: &LayoutConfig,
    rng: &mut R,
) -> HashMap<String, Position> {
    let mut buckets: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for id in &graph.ids {
        let level = levels.get(id).copied().unwrap_or(0);
        buckets.entry(level).or_default().push(id.clone());
    }

    let mut positions = HashMap::with_capacity(graph.ids.len());
    for (level, mut bucket) in buckets {
        order_level(&mut bucket, graph, config);
        let center_slot = (bucket.len() as f64 - 1.0) / 2.0;
        for (slot, id) in bucket.into_iter().enumerate() {
            let mut y = config.center_y
                + (slot as f64 - center_slot) * config.node_spacing
                + jitter(rng, config.jitter);
            if graph.self_loops.contains(&id) || has_backward_transition(graph, levels, &id) {
                let direction = if slot % 2 == 0 { 1.0 } else { -1.0 };
                y += direction * config.loop_push;
            }
            let x = config.origin_x
                + level as f64 * config.level_spacing
                + jitter(rng, config.jitter * 0.5);
            positions.insert(id, Position::new(x, y));
        }
    }
    positions
}
