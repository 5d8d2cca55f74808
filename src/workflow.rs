use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a state (or transition node) on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDefinition {
    pub name: String,
    pub next: String,
    #[serde(default)]
    pub manual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processors: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion: Option<serde_json::Value>,
}

impl TransitionDefinition {
    pub fn new(name: impl Into<String>, next: impl Into<String>, manual: bool) -> Self {
        Self {
            name: name.into(),
            next: next.into(),
            manual,
            disabled: None,
            processors: None,
            criterion: None,
        }
    }

    pub fn is_conditional(&self) -> bool {
        self.criterion.as_ref().is_some_and(|c| !c.is_null())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfiguration {
    #[serde(default = "default_configuration_version")]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub initial_state: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub states: IndexMap<String, StateDefinition>,
}

fn default_configuration_version() -> String {
    "1.0".to_string()
}

impl Default for WorkflowConfiguration {
    fn default() -> Self {
        Self {
            version: default_configuration_version(),
            name: String::new(),
            description: None,
            initial_state: String::new(),
            active: true,
            states: IndexMap::new(),
        }
    }
}

impl WorkflowConfiguration {
    /// Initial state actually used by consumers: the declared one when it
    /// exists, otherwise the first state key.
    pub fn effective_initial_state(&self) -> Option<&str> {
        if self.states.contains_key(&self.initial_state) {
            return Some(self.initial_state.as_str());
        }
        self.states.keys().next().map(String::as_str)
    }

    pub fn transition_count(&self) -> usize {
        self.states.values().map(|s| s.transitions.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutStateEntry {
    pub id: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

/// Per-segment anchor override kept from older layouts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTransitionEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub segment_handles: BTreeMap<String, HandleOverride>,
}

impl LayoutTransitionEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasLayout {
    #[serde(default)]
    pub states: Vec<LayoutStateEntry>,
    #[serde(default)]
    pub transitions: Vec<LayoutTransitionEntry>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl CanvasLayout {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
            updated_at: now,
            version: 1,
        }
    }

    pub fn state_position(&self, state_id: &str) -> Option<Position> {
        self.states
            .iter()
            .find(|entry| entry.id == state_id)
            .map(|entry| entry.position)
    }

    pub fn transition(&self, transition_id: &str) -> Option<&LayoutTransitionEntry> {
        self.transitions.iter().find(|entry| entry.id == transition_id)
    }

    /// Records a layout change: stamps `updated_at` and bumps `version`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version = self.version.saturating_add(1);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityModel {
    pub model_name: String,
    pub model_version: u32,
}

impl Default for EntityModel {
    fn default() -> Self {
        Self {
            model_name: "workflow".to_string(),
            model_version: 1,
        }
    }
}

/// The unit of persistence and of history snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UIWorkflowData {
    pub id: String,
    #[serde(default)]
    pub entity_model: EntityModel,
    pub configuration: WorkflowConfiguration,
    pub layout: CanvasLayout,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UIWorkflowData {
    /// Creates an empty workflow with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entity_model: EntityModel::default(),
            configuration: WorkflowConfiguration {
                name: name.into(),
                ..Default::default()
            },
            layout: CanvasLayout::empty(now),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stamp(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
