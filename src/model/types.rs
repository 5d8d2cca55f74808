use serde::Serialize;

use crate::workflow::{Position, TransitionDefinition};

/// Position used for a state that has no layout entry yet.
pub const DEFAULT_STATE_POSITION: Position = Position::new(100.0, 100.0);

// Default grid used when a layout has to be synthesized or backfilled.
pub const GRID_COLUMNS: usize = 4;
pub const GRID_ORIGIN_X: f64 = 100.0;
pub const GRID_ORIGIN_Y: f64 = 100.0;
pub const GRID_SPACING_X: f64 = 250.0;
pub const GRID_SPACING_Y: f64 = 150.0;

pub fn grid_position(slot: usize) -> Position {
    let column = slot % GRID_COLUMNS;
    let row = slot / GRID_COLUMNS;
    Position::new(
        GRID_ORIGIN_X + column as f64 * GRID_SPACING_X,
        GRID_ORIGIN_Y + row as f64 * GRID_SPACING_Y,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UIStateData {
    pub id: String,
    pub name: String,
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
    pub is_initial: bool,
    pub is_final: bool,
    pub transition_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UITransitionData {
    pub id: String,
    pub source_state_id: String,
    pub target_state_id: String,
    pub transition_index: usize,
    pub definition: TransitionDefinition,
    pub is_self_loop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

/// Everything a canvas renderer needs for one redraw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowView {
    pub states: Vec<UIStateData>,
    pub transitions: Vec<UITransitionData>,
}

impl WorkflowView {
    pub fn state(&self, id: &str) -> Option<&UIStateData> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn transition(&self, id: &str) -> Option<&UITransitionData> {
        self.transitions.iter().find(|t| t.id == id)
    }
}
