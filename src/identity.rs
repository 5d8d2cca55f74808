//! Positional transition identity.
//!
//! Transitions carry no stored id. A transition is addressed by the id of its
//! source state plus its index in that state's transition array, encoded as
//! `"<source>-transition-<index>"`. Ids shift whenever an earlier transition
//! in the same array is removed or reordered, so consumers re-derive them
//! instead of caching.
//!
//! Older layouts keyed transition metadata by `"<source>-><target>"`. Those
//! legacy ids are still understood for lookup and migration.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::workflow::StateDefinition;

pub const TRANSITION_SEPARATOR: &str = "-transition-";
pub const LEGACY_SEPARATOR: &str = "->";

// Greedy source capture: the last separator wins, so the index is always the
// trailing digits. Leading zeros are rejected so each transition has exactly
// one spelling.
static TRANSITION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)-transition-(0|[1-9]\d*)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRef {
    pub source_state_id: String,
    pub transition_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransitionRef {
    pub source_state_id: String,
    pub target_state_id: String,
}

pub fn generate_transition_id(source_state_id: &str, index: usize) -> String {
    format!("{source_state_id}{TRANSITION_SEPARATOR}{index}")
}

pub fn parse_transition_id(id: &str) -> Option<TransitionRef> {
    let caps = TRANSITION_ID_RE.captures(id)?;
    let transition_index = caps.get(2)?.as_str().parse::<usize>().ok()?;
    Some(TransitionRef {
        source_state_id: caps.get(1)?.as_str().to_string(),
        transition_index,
    })
}

pub fn generate_layout_transition_id(source_state_id: &str, target_state_id: &str) -> String {
    format!("{source_state_id}{LEGACY_SEPARATOR}{target_state_id}")
}

pub fn parse_layout_transition_id(id: &str) -> Option<LegacyTransitionRef> {
    if parse_transition_id(id).is_some() {
        return None;
    }
    let (source, target) = id.split_once(LEGACY_SEPARATOR)?;
    if source.is_empty() || target.is_empty() {
        return None;
    }
    Some(LegacyTransitionRef {
        source_state_id: source.to_string(),
        target_state_id: target.to_string(),
    })
}

/// Converts a legacy source→target id to the canonical id of the first
/// transition from `source` whose `next` is `target`.
pub fn migrate_layout_transition_id(
    legacy_id: &str,
    states: &IndexMap<String, StateDefinition>,
) -> Option<String> {
    let legacy = parse_layout_transition_id(legacy_id)?;
    let state = states.get(&legacy.source_state_id)?;
    let index = state
        .transitions
        .iter()
        .position(|t| t.next == legacy.target_state_id)?;
    Some(generate_transition_id(&legacy.source_state_id, index))
}

pub fn validate_transition_exists(id: &str, states: &IndexMap<String, StateDefinition>) -> bool {
    let Some(parsed) = parse_transition_id(id) else {
        return false;
    };
    states
        .get(&parsed.source_state_id)
        .is_some_and(|state| parsed.transition_index < state.transitions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::TransitionDefinition;
    use proptest::prelude::*;

    fn states() -> IndexMap<String, StateDefinition> {
        let mut states = IndexMap::new();
        states.insert(
            "draft".to_string(),
            StateDefinition {
                name: None,
                transitions: vec![
                    TransitionDefinition::new("submit", "review", false),
                    TransitionDefinition::new("discard", "closed", true),
                ],
            },
        );
        states.insert("review".to_string(), StateDefinition::default());
        states.insert("closed".to_string(), StateDefinition::default());
        states
    }

    #[test]
    fn generates_canonical_id() {
        assert_eq!(generate_transition_id("draft", 1), "draft-transition-1");
    }

    #[test]
    fn malformed_ids_parse_to_none() {
        assert_eq!(parse_transition_id(""), None);
        assert_eq!(parse_transition_id("draft"), None);
        assert_eq!(parse_transition_id("draft-transition-"), None);
        assert_eq!(parse_transition_id("-transition-3"), None);
        assert_eq!(parse_transition_id("draft-transition-x1"), None);
        assert_eq!(parse_transition_id("draft-transition-01"), None);
        assert_eq!(parse_transition_id("draft-transition-00"), None);
        assert_eq!(parse_transition_id("draft-transition-99999999999999999999999999"), None);
    }

    #[test]
    fn source_may_contain_separator_like_text() {
        let id = generate_transition_id("a-transition-2", 7);
        let parsed = parse_transition_id(&id).unwrap();
        assert_eq!(parsed.source_state_id, "a-transition-2");
        assert_eq!(parsed.transition_index, 7);
    }

    #[test]
    fn legacy_ids_round_trip_and_do_not_shadow_canonical() {
        let legacy = generate_layout_transition_id("draft", "review");
        assert_eq!(legacy, "draft->review");
        let parsed = parse_layout_transition_id(&legacy).unwrap();
        assert_eq!(parsed.source_state_id, "draft");
        assert_eq!(parsed.target_state_id, "review");
        assert_eq!(parse_layout_transition_id("draft-transition-0"), None);
        assert_eq!(parse_layout_transition_id("->review"), None);
        assert_eq!(parse_layout_transition_id("plain"), None);
    }

    #[test]
    fn migrates_legacy_to_first_matching_index() {
        let states = states();
        assert_eq!(
            migrate_layout_transition_id("draft->closed", &states).as_deref(),
            Some("draft-transition-1")
        );
        assert_eq!(migrate_layout_transition_id("draft->nowhere", &states), None);
        assert_eq!(migrate_layout_transition_id("ghost->review", &states), None);
        assert_eq!(migrate_layout_transition_id("draft-transition-0", &states), None);
    }

    #[test]
    fn validates_against_current_transitions() {
        let states = states();
        assert!(validate_transition_exists("draft-transition-0", &states));
        assert!(validate_transition_exists("draft-transition-1", &states));
        assert!(!validate_transition_exists("draft-transition-2", &states));
        assert!(!validate_transition_exists("review-transition-0", &states));
        assert!(!validate_transition_exists("ghost-transition-0", &states));
        assert!(!validate_transition_exists("draft->review", &states));
        assert!(!validate_transition_exists("draft-transition-01", &states));
    }

    proptest! {
        #[test]
        fn parse_inverts_generate(source in "[A-Za-z0-9_ .-]{1,24}", index in 0usize..10_000) {
            let id = generate_transition_id(&source, index);
            let parsed = parse_transition_id(&id).unwrap();
            prop_assert_eq!(parsed.source_state_id, source);
            prop_assert_eq!(parsed.transition_index, index);
        }

        #[test]
        fn generate_is_deterministic(source in "[a-z_]{1,12}", index in 0usize..64) {
            prop_assert_eq!(
                generate_transition_id(&source, index),
                generate_transition_id(&source, index)
            );
        }
    }
}
