use std::collections::{HashMap, VecDeque};

use super::types::StateGraph;
use crate::config::LayoutConfig;

/// Assigns a level to every state: BFS distance from the initial state,
/// terminal-named states floor-clamped to `terminal_min_level`, and each
/// unreachable state on its own level after the deepest reached one.
pub(super) fn assign_levels(graph: &StateGraph, config: &LayoutConfig) -> HashMap<String, usize> {
    let mut levels: HashMap<String, usize> = HashMap::with_capacity(graph.ids.len());
    let mut queue: VecDeque<String> = VecDeque::new();
    levels.insert(graph.initial.clone(), 0);
    queue.push_back(graph.initial.clone());

    while let Some(current) = queue.pop_front() {
        let current_level = levels.get(&current).copied().unwrap_or(0);
        let candidate = current_level + 1;
        for next in graph.successors(&current) {
            // Reached at or before this level already: skip, which also keeps
            // cycles from requeueing forever.
            if levels.get(next).is_some_and(|&level| level <= candidate) {
                continue;
            }
            levels.insert(next.clone(), candidate);
            queue.push_back(next.clone());
        }
    }

    for id in &graph.ids {
        if *id == graph.initial || !config.looks_terminal(id) {
            continue;
        }
        if let Some(level) = levels.get_mut(id) {
            *level = (*level).max(config.terminal_min_level);
        }
    }

    let mut max_level = levels.values().copied().max().unwrap_or(0);
    for id in &graph.ids {
        if levels.contains_key(id) {
            continue;
        }
        max_level += 1;
        levels.insert(id.clone(), max_level);
    }

    levels
}
