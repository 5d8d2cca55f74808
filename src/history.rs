//! Linear undo/redo over whole-workflow snapshots, kept per workflow id.
//!
//! Callers record an entry only for user-intended edits (connect, delete,
//! rename, drag release, JSON save). Re-deriving the view is never recorded.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::config::HistoryConfig;
use crate::workflow::UIWorkflowData;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub snapshot: UIWorkflowData,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct WorkflowHistory {
    undo: VecDeque<HistoryEntry>,
    redo: VecDeque<HistoryEntry>,
}

#[derive(Debug)]
pub struct HistoryService {
    max_entries: usize,
    workflows: HashMap<String, WorkflowHistory>,
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

fn push_bounded(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, max: usize) {
    stack.push_back(entry);
    while stack.len() > max {
        stack.pop_front();
    }
}

impl HistoryService {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            max_entries: config.max_entries.max(1),
            workflows: HashMap::new(),
        }
    }

    /// Records the pre-edit snapshot and invalidates the redo branch.
    pub fn add_entry(
        &mut self,
        workflow_id: &str,
        snapshot_before_change: &UIWorkflowData,
        description: impl Into<String>,
    ) {
        let description = description.into();
        let history = self.workflows.entry(workflow_id.to_string()).or_default();
        history.redo.clear();
        push_bounded(
            &mut history.undo,
            HistoryEntry {
                snapshot: snapshot_before_change.clone(),
                description,
                recorded_at: Utc::now(),
            },
            self.max_entries,
        );
        debug!(workflow = workflow_id, depth = history.undo.len(), "recorded history entry");
    }

    /// Pops the latest snapshot; `current` (the state being replaced) moves
    /// onto the redo stack. Returns `None` when there is nothing to undo.
    pub fn undo(&mut self, workflow_id: &str, current: &UIWorkflowData) -> Option<UIWorkflowData> {
        let max = self.max_entries;
        let history = self.workflows.get_mut(workflow_id)?;
        let entry = history.undo.pop_back()?;
        push_bounded(
            &mut history.redo,
            HistoryEntry {
                snapshot: current.clone(),
                description: entry.description.clone(),
                recorded_at: Utc::now(),
            },
            max,
        );
        Some(entry.snapshot)
    }

    pub fn redo(&mut self, workflow_id: &str, current: &UIWorkflowData) -> Option<UIWorkflowData> {
        let max = self.max_entries;
        let history = self.workflows.get_mut(workflow_id)?;
        let entry = history.redo.pop_back()?;
        push_bounded(
            &mut history.undo,
            HistoryEntry {
                snapshot: current.clone(),
                description: entry.description.clone(),
                recorded_at: Utc::now(),
            },
            max,
        );
        Some(entry.snapshot)
    }

    pub fn can_undo(&self, workflow_id: &str) -> bool {
        self.undo_count(workflow_id) > 0
    }

    pub fn can_redo(&self, workflow_id: &str) -> bool {
        self.redo_count(workflow_id) > 0
    }

    pub fn undo_count(&self, workflow_id: &str) -> usize {
        self.workflows.get(workflow_id).map_or(0, |h| h.undo.len())
    }

    pub fn redo_count(&self, workflow_id: &str) -> usize {
        self.workflows.get(workflow_id).map_or(0, |h| h.redo.len())
    }

    pub fn last_undo_description(&self, workflow_id: &str) -> Option<&str> {
        self.workflows
            .get(workflow_id)?
            .undo
            .back()
            .map(|e| e.description.as_str())
    }

    pub fn last_redo_description(&self, workflow_id: &str) -> Option<&str> {
        self.workflows
            .get(workflow_id)?
            .redo
            .back()
            .map(|e| e.description.as_str())
    }

    /// Empties both stacks but keeps tracking the workflow.
    pub fn clear(&mut self, workflow_id: &str) {
        if let Some(history) = self.workflows.get_mut(workflow_id) {
            history.undo.clear();
            history.redo.clear();
        }
    }

    /// Drops all history for a workflow, e.g. when its tab closes.
    pub fn remove_workflow(&mut self, workflow_id: &str) -> bool {
        self.workflows.remove(workflow_id).is_some()
    }

    pub fn tracked_workflows(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.workflows.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::add_state;

    fn versions() -> (UIWorkflowData, UIWorkflowData, UIWorkflowData) {
        let a = UIWorkflowData::new("wf");
        let (b, _) = add_state(&a, "one", None);
        let (c, _) = add_state(&b, "two", None);
        (a, b, c)
    }

    #[test]
    fn undo_returns_recorded_snapshot_and_redo_restores() {
        let (a, b, _) = versions();
        let mut history = HistoryService::default();
        history.add_entry("w", &a, "add state");

        let undone = history.undo("w", &b).unwrap();
        assert_eq!(undone, a);
        assert!(!history.can_undo("w"));
        assert!(history.can_redo("w"));

        let redone = history.redo("w", &undone).unwrap();
        assert_eq!(redone, b);
        assert_eq!(history.undo_count("w"), 1);
        assert_eq!(history.redo_count("w"), 0);
    }

    #[test]
    fn empty_stacks_return_none() {
        let (a, _, _) = versions();
        let mut history = HistoryService::default();
        assert_eq!(history.undo("w", &a), None);
        assert_eq!(history.redo("w", &a), None);
        history.add_entry("w", &a, "x");
        history.undo("w", &a);
        assert_eq!(history.undo("w", &a), None);
    }

    #[test]
    fn new_entry_clears_redo() {
        let (a, b, c) = versions();
        let mut history = HistoryService::default();
        history.add_entry("w", &a, "first");
        history.undo("w", &b);
        assert_eq!(history.redo_count("w"), 1);
        history.add_entry("w", &a, "branch");
        assert_eq!(history.redo_count("w"), 0);
        assert_eq!(history.redo("w", &c), None);
        assert_eq!(history.last_undo_description("w"), Some("branch"));
    }

    #[test]
    fn stacks_are_bounded() {
        let (a, _, _) = versions();
        let mut history = HistoryService::new(&HistoryConfig { max_entries: 3 });
        for i in 0..10 {
            history.add_entry("w", &a, format!("edit {i}"));
        }
        assert_eq!(history.undo_count("w"), 3);
        assert_eq!(history.last_undo_description("w"), Some("edit 9"));
    }

    #[test]
    fn workflows_do_not_share_history() {
        let (a, b, _) = versions();
        let mut history = HistoryService::default();
        history.add_entry("left", &a, "l");
        assert!(history.can_undo("left"));
        assert!(!history.can_undo("right"));
        assert_eq!(history.undo("right", &b), None);
        assert_eq!(history.undo_count("left"), 1);
    }

    #[test]
    fn redo_entry_keeps_description() {
        let (a, b, _) = versions();
        let mut history = HistoryService::default();
        history.add_entry("w", &a, "rename state");
        history.undo("w", &b);
        assert_eq!(history.last_redo_description("w"), Some("rename state"));
    }

    #[test]
    fn teardown_and_clear() {
        let (a, _, _) = versions();
        let mut history = HistoryService::default();
        history.add_entry("w", &a, "x");
        history.add_entry("v", &a, "y");
        assert_eq!(history.tracked_workflows(), ["v", "w"]);
        history.clear("w");
        assert!(!history.can_undo("w"));
        assert!(history.remove_workflow("v"));
        assert!(!history.remove_workflow("v"));
        assert_eq!(history.tracked_workflows(), ["w"]);
    }
}
