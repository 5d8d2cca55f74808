use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use workflow_canvas::history::HistoryService;
use workflow_canvas::layout::apply_auto_layout_with_rng;
use workflow_canvas::model::{
    add_state, add_transition, cleanup_workflow_state, delete_state, delete_transition,
    derive_view, import_configuration, migrate_layout, move_state, reconcile_workflow,
    rename_state,
};
use workflow_canvas::{
    LayoutConfig, Position, UIWorkflowData, ValidationIssue, WorkflowConfiguration, WorkflowError,
    parse_configuration, validate_configuration,
};

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_workflow(name: &str) -> UIWorkflowData {
    serde_json::from_str(&read_fixture(name)).expect("fixture is not a workflow document")
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_root().join(name)).expect("fixture read failed")
}

fn layout_ids(workflow: &UIWorkflowData) -> Vec<&str> {
    workflow
        .layout
        .transitions
        .iter()
        .map(|entry| entry.id.as_str())
        .collect()
}

#[test]
fn cleanup_prunes_stale_fixture_entries() {
    let workflow = load_workflow("order_approval.json");
    let cleaned = cleanup_workflow_state(&workflow);

    let states: Vec<&str> = cleaned.layout.states.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(states, ["draft", "review", "approved"]);
    assert_eq!(
        layout_ids(&cleaned),
        ["draft-transition-0", "review-transition-1", "approved->order_complete"]
    );
    assert_eq!(cleaned.configuration, workflow.configuration);
    assert_eq!(cleaned.layout.version, workflow.layout.version);
    assert_eq!(cleanup_workflow_state(&cleaned), cleaned);
}

#[test]
fn derived_view_covers_every_transition() {
    let workflow = load_workflow("order_approval.json");
    let view = derive_view(&workflow);

    assert_eq!(view.states.len(), 6);
    assert_eq!(view.transitions.len(), workflow.configuration.transition_count());
    let ids: Vec<&str> = view.transitions.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "draft-transition-0",
            "draft-transition-1",
            "review-transition-0",
            "review-transition-1",
            "review-transition-2",
            "manager_review-transition-0",
            "approved-transition-0",
        ]
    );

    let draft = view.state("draft").unwrap();
    assert!(draft.is_initial);
    assert_eq!(draft.name, "Draft");
    assert_eq!(draft.transition_ids, ["draft-transition-0", "draft-transition-1"]);

    let complete = view.state("order_complete").unwrap();
    assert!(complete.is_final);
    assert_eq!(complete.position, Position::new(100.0, 100.0));

    let autosave = view.transition("draft-transition-1").unwrap();
    assert!(autosave.is_self_loop);

    let submit = view.transition("draft-transition-0").unwrap();
    assert_eq!(submit.label_position, Some(Position::new(0.0, -20.0)));

    let reject = view.transition("review-transition-1").unwrap();
    assert_eq!(reject.source_handle.as_deref(), Some("bottom"));
    assert_eq!(reject.target_state_id, "draft");

    let ship = view.transition("approved-transition-0").unwrap();
    assert_eq!(ship.source_handle.as_deref(), Some("right"));
    assert_eq!(ship.target_handle.as_deref(), Some("left"));
}

#[test]
fn migration_rekeys_legacy_entries() {
    let workflow = cleanup_workflow_state(&load_workflow("order_approval.json"));
    let migrated = migrate_layout(&workflow);
    assert_eq!(
        layout_ids(&migrated),
        ["draft-transition-0", "review-transition-1", "approved-transition-0"]
    );
    assert!(migrated.layout.version > workflow.layout.version);

    let view = derive_view(&migrated);
    let ship = view.transition("approved-transition-0").unwrap();
    assert_eq!(ship.source_handle.as_deref(), Some("right"));
}

#[test]
fn bare_configuration_imports_with_positions_for_all_states() {
    let text = read_fixture("bare_configuration.json");
    match parse_configuration(&text) {
        Err(WorkflowError::Validation(issues)) => assert_eq!(
            issues,
            [ValidationIssue::UnknownInitialState("missing_initial".into())]
        ),
        other => panic!("expected a validation error, got {other:?}"),
    }

    let configuration: WorkflowConfiguration = serde_json::from_str(&text).unwrap();
    assert_eq!(validate_configuration(&configuration).len(), 1);

    let workflow = import_configuration(configuration);
    assert_eq!(workflow.layout.states.len(), 6);
    let reconciled = reconcile_workflow(&workflow);
    assert_eq!(reconciled.layout, workflow.layout);

    let view = derive_view(&workflow);
    assert!(view.state("new").unwrap().is_initial);
}

#[test]
fn auto_layout_levels_fixture_graph() {
    let workflow = load_workflow("order_approval.json");
    let mut rng = StdRng::seed_from_u64(7);
    let config = LayoutConfig::default();
    let laid_out = apply_auto_layout_with_rng(&workflow, &config, &mut rng);

    let x = |id: &str| laid_out.layout.state_position(id).unwrap().x;
    assert!(x("draft") < x("review"));
    assert!(x("review") < x("approved"));
    assert!(x("approved") < x("order_complete"));
    assert!(x("order_complete") < x("archived"));
    assert_eq!(laid_out.layout.states.len(), 6);

    let review = laid_out
        .layout
        .states
        .iter()
        .find(|entry| entry.id == "review")
        .unwrap();
    assert!(review.properties.is_some());
    assert_eq!(laid_out.configuration, workflow.configuration);
    assert!(laid_out.layout.version > workflow.layout.version);

    let again = apply_auto_layout_with_rng(&workflow, &config, &mut StdRng::seed_from_u64(7));
    assert_eq!(again.layout.states, laid_out.layout.states);
}

#[test]
fn two_state_scenario_connect_rename_and_delete() {
    let workflow = UIWorkflowData::new("scenario");
    let (workflow, a) = add_state(&workflow, "a", None);
    let (workflow, b) = add_state(&workflow, "b", Some(Position::new(400.0, 100.0)));
    let (workflow, id) = add_transition(&workflow, &a, &b, Some("go"), false);
    assert_eq!(id.as_deref(), Some("a-transition-0"));

    let view = derive_view(&workflow);
    assert_eq!(view.transitions.len(), 1);
    assert!(view.state("a").unwrap().is_initial);
    assert!(view.state("b").unwrap().is_final);

    let renamed = rename_state(&workflow, "b", "done");
    assert_eq!(renamed.configuration.states["a"].transitions[0].next, "done");
    assert_eq!(
        renamed.layout.state_position("done"),
        Some(Position::new(400.0, 100.0))
    );

    let deleted = delete_state(&renamed, "done");
    assert!(deleted.configuration.states["a"].transitions.is_empty());
    assert!(derive_view(&deleted).transitions.is_empty());
}

#[test]
fn deleting_a_transition_keeps_sibling_layout() {
    let workflow = cleanup_workflow_state(&load_workflow("order_approval.json"));
    let trimmed = delete_transition(&workflow, "review-transition-0");
    assert_eq!(trimmed.configuration.states["review"].transitions.len(), 2);
    let view = derive_view(&trimmed);
    let reject = view.transition("review-transition-0").unwrap();
    assert_eq!(reject.definition.name, "reject");
    assert_eq!(reject.source_handle.as_deref(), Some("bottom"));
}

#[test]
fn history_walks_edits_back_and_forth() {
    let original = load_workflow("order_approval.json");
    let mut history = HistoryService::default();
    let id = original.id.clone();

    history.add_entry(&id, &original, "move draft");
    let moved = move_state(&original, "draft", Position::new(10.0, 10.0));
    history.add_entry(&id, &moved, "delete archived");
    let deleted = delete_state(&moved, "archived");

    let back = history.undo(&id, &deleted).unwrap();
    assert_eq!(back, moved);
    let back = history.undo(&id, &back).unwrap();
    assert_eq!(back, original);
    assert!(!history.can_undo(&id));

    let forward = history.redo(&id, &back).unwrap();
    assert_eq!(forward, moved);
    let forward = history.redo(&id, &forward).unwrap();
    assert_eq!(forward, deleted);
    assert!(!history.can_redo(&id));
}

#[test]
fn document_round_trips_through_json() {
    let workflow = load_workflow("order_approval.json");
    let text = serde_json::to_string_pretty(&workflow).unwrap();
    let back: UIWorkflowData = serde_json::from_str(&text).unwrap();
    assert_eq!(back, workflow);
    let state_keys: Vec<&str> = back.configuration.states.keys().map(String::as_str).collect();
    assert_eq!(
        state_keys,
        ["draft", "review", "manager_review", "approved", "order_complete", "archived"]
    );
}
