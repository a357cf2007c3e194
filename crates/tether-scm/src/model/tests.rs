//! Unit tests for the domain values.

use rstest::rstest;
use time::macros::datetime;

use super::*;

// ---------------------------------------------------------------------------
// Property configuration
// ---------------------------------------------------------------------------

#[test]
fn property_defaults_are_false_and_zero() {
    let property = Property::new("url", "https://example.com");
    assert!(!property.is_required());
    assert!(!property.is_secure());
    assert!(!property.is_part_of_identity());
    assert_eq!(property.display_name(), "");
    assert_eq!(property.display_order(), 0);
}

#[test]
fn insert_replaces_in_place() {
    let mut configuration = PropertyConfiguration::from_values([("a", "1"), ("b", "2")]);
    let replaced = configuration.insert(Property::new("a", "3"));

    assert_eq!(replaced.map(|p| p.value().to_owned()), Some("1".to_owned()));
    let keys: Vec<&str> = configuration.iter().map(Property::key).collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(configuration.value("a"), Some("3"));
}

#[test]
fn equality_ignores_insertion_order() {
    let forwards = PropertyConfiguration::from_values([("a", "1"), ("b", "2")]);
    let backwards = PropertyConfiguration::from_values([("b", "2"), ("a", "1")]);
    assert_eq!(forwards, backwards);
}

#[rstest]
#[case::different_value([("a", "1"), ("b", "9")])]
#[case::different_key([("a", "1"), ("c", "2")])]
fn equality_compares_contents(#[case] other: [(&str, &str); 2]) {
    let configuration = PropertyConfiguration::from_values([("a", "1"), ("b", "2")]);
    assert_ne!(configuration, PropertyConfiguration::from_values(other));
}

#[test]
fn equality_includes_metadata_but_identity_does_not() {
    let mut plain = PropertyConfiguration::new();
    plain.insert(Property::new("url", "git@example.com"));
    let mut secure = PropertyConfiguration::new();
    secure.insert(Property::new("url", "git@example.com").with_secure(true));

    assert_ne!(plain, secure);
    assert_eq!(plain.identity(), secure.identity());
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[test]
fn validation_outcome_success_follows_errors() {
    assert!(ValidationOutcome::success().is_successful());
    let failed = ValidationOutcome::with_errors(vec![ValidationError::for_field("url", "bad")]);
    assert!(!failed.is_successful());
    assert_eq!(failed.errors().len(), 1);
}

#[test]
fn general_validation_error_has_empty_field() {
    assert_eq!(ValidationError::general("broken").field(), "");
}

#[rstest]
#[case::none(vec![], "")]
#[case::one(vec!["connected"], "connected")]
#[case::many(vec!["first", "second"], "first, second")]
fn check_result_joins_messages(#[case] messages: Vec<&str>, #[case] expected: &str) {
    let result = CheckResult::success(messages.into_iter().map(str::to_owned).collect());
    assert_eq!(result.messages_for_display(), expected);
}

#[test]
fn check_result_reports_status() {
    assert!(CheckResult::success(vec![]).is_successful());
    let failed = CheckResult::failure(vec![]);
    assert!(!failed.is_successful());
    assert_eq!(failed.status(), CheckStatus::Failure);
}

// ---------------------------------------------------------------------------
// Revisions and poll results
// ---------------------------------------------------------------------------

#[rstest]
#[case::added("added", Some(ModifiedAction::Added))]
#[case::modified("modified", Some(ModifiedAction::Modified))]
#[case::deleted("deleted", Some(ModifiedAction::Deleted))]
#[case::capitalised("Added", None)]
#[case::unknown("renamed", None)]
fn parses_modified_actions(#[case] name: &str, #[case] expected: Option<ModifiedAction>) {
    assert_eq!(ModifiedAction::from_wire(name), expected);
}

#[test]
fn action_names_round_trip() {
    for name in ModifiedAction::NAMES {
        let action = ModifiedAction::from_wire(name).expect("known action");
        assert_eq!(action.as_str(), *name);
    }
}

#[test]
fn plugin_material_data_replaces_persisted_data() {
    let persisted = MaterialData::from([("old".to_owned(), "1".to_owned())]);
    let returned = MaterialData::from([("new".to_owned(), "2".to_owned())]);
    let revision = Revision::new("r1", datetime!(2011-07-13 19:43:37.100 UTC));
    let result = PollResult::latest(revision, Some(returned.clone()));

    assert_eq!(result.material_data_after(&persisted), returned);
}

#[test]
fn persisted_data_survives_when_plugin_sends_none() {
    let persisted = MaterialData::from([("old".to_owned(), "1".to_owned())]);
    let result = PollResult::since(Some(vec![]), None);
    assert_eq!(result.material_data_after(&persisted), persisted);
}

#[test]
fn revision_list_defaults_to_empty() {
    let result = PollResult::since(None, None).with_revision_list();
    assert_eq!(result.revisions(), Some(&[][..]));
    assert!(result.latest_revision().is_none());
}
