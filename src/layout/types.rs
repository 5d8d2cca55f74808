use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::workflow::{Position, WorkflowConfiguration};

/// Topology view of a configuration used by the layout passes. Self-loops are
/// recorded separately and never appear in `adjacency`.
#[derive(Debug, Clone)]
pub struct StateGraph {
    pub ids: Vec<String>,
    pub initial: String,
    pub adjacency: HashMap<String, Vec<String>>,
    pub self_loops: HashSet<String>,
    pub conditional: HashSet<String>,
    pub out_degree: HashMap<String, usize>,
    pub finals: HashSet<String>,
}

impl StateGraph {
    /// Returns `None` for a configuration without states.
    pub fn build(configuration: &WorkflowConfiguration) -> Option<Self> {
        let initial = configuration.effective_initial_state()?.to_string();
        let mut graph = StateGraph {
            ids: configuration.states.keys().cloned().collect(),
            initial,
            adjacency: HashMap::new(),
            self_loops: HashSet::new(),
            conditional: HashSet::new(),
            out_degree: HashMap::new(),
            finals: HashSet::new(),
        };

        for (state_id, state) in &configuration.states {
            graph
                .out_degree
                .insert(state_id.clone(), state.transitions.len());
            if state.transitions.is_empty() {
                graph.finals.insert(state_id.clone());
            }
            let targets = graph.adjacency.entry(state_id.clone()).or_default();
            for transition in &state.transitions {
                if transition.is_conditional() {
                    graph.conditional.insert(state_id.clone());
                }
                if &transition.next == state_id {
                    graph.self_loops.insert(state_id.clone());
                    continue;
                }
                if !configuration.states.contains_key(&transition.next) {
                    continue;
                }
                if !targets.contains(&transition.next) {
                    targets.push(transition.next.clone());
                }
            }
        }
        Some(graph)
    }

    pub fn successors(&self, id: &str) -> &[String] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Result of one auto-layout run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoLayout {
    /// One position per configuration state, in configuration order.
    pub positions: IndexMap<String, Position>,
    pub levels: IndexMap<String, usize>,
    /// States carrying a self-loop; the renderer offsets their loop edge.
    pub self_loop_states: Vec<String>,
}

impl AutoLayout {
    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn level(&self, id: &str) -> Option<usize> {
        self.levels.get(id).copied()
    }
}
