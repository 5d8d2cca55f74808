use crate::error::{Result, ValidationIssue, WorkflowError};
use crate::identity::TRANSITION_SEPARATOR;
use crate::workflow::WorkflowConfiguration;

/// Lists every shape problem in `config`. An empty list means the
/// configuration is fully consistent.
pub fn validate_configuration(config: &WorkflowConfiguration) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !config.states.is_empty() {
        if config.initial_state.is_empty() {
            issues.push(ValidationIssue::MissingInitialState);
        } else if !config.states.contains_key(&config.initial_state) {
            issues.push(ValidationIssue::UnknownInitialState(
                config.initial_state.clone(),
            ));
        }
    }

    for (state_id, state) in &config.states {
        if state_id.is_empty() {
            issues.push(ValidationIssue::EmptyStateId);
        } else if state_id.contains(TRANSITION_SEPARATOR) {
            issues.push(ValidationIssue::ReservedSeparator(state_id.clone()));
        }
        for (index, transition) in state.transitions.iter().enumerate() {
            if !config.states.contains_key(&transition.next) {
                issues.push(ValidationIssue::DanglingTarget {
                    state: state_id.clone(),
                    index,
                    target: transition.next.clone(),
                });
            }
        }
    }

    issues
}

/// Parses configuration text coming from an editor. Missing top-level keys are
/// reported as validation issues rather than opaque decode errors.
pub fn parse_configuration(text: &str) -> Result<WorkflowConfiguration> {
    let raw: serde_json::Value = serde_json::from_str(text)?;

    let mut shape_issues = Vec::new();
    if !raw.get("states").is_some_and(|v| v.is_object()) {
        shape_issues.push(ValidationIssue::MissingStates);
    }
    if !raw.get("initialState").is_some_and(|v| v.is_string()) {
        shape_issues.push(ValidationIssue::MissingInitialState);
    }
    if !shape_issues.is_empty() {
        return Err(WorkflowError::Validation(shape_issues));
    }

    let config: WorkflowConfiguration = serde_json::from_value(raw)?;
    let issues = validate_configuration(&config);
    if issues.is_empty() {
        Ok(config)
    } else {
        Err(WorkflowError::Validation(issues))
    }
}
