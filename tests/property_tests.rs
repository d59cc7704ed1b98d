//! Property-based tests using proptest
//!
//! Generated names and archive paths check that nothing accepted by the
//! validator or the ingestor can address a location outside its root.

use proptest::prelude::*;

use remote_storage::application::archive::{ArchiveError, ArchiveIngestor};
use remote_storage::domain::validation::NameValidator;

/// Strategy for names built only from the allowed alphabet
fn safe_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-][A-Za-z0-9_.-]{0,40}".prop_filter("no parent references", |s| !s.contains(".."))
}

/// Strategy for archive entry names mixing normal, dot and separator segments
fn entry_name_strategy() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        3 => "[a-z0-9_]{1,8}(\\.js)?",
        1 => Just("..".to_string()),
        1 => Just(".".to_string()),
        1 => Just(String::new()),
    ];
    (
        prop::collection::vec(segment, 1..6),
        prop_oneof![Just("/"), Just("\\")],
    )
        .prop_map(|(segments, separator)| segments.join(separator))
}

proptest! {
    #[test]
    fn prop_safe_names_are_accepted(name in safe_name_strategy()) {
        prop_assert!(NameValidator::validate(&name));
    }

    #[test]
    fn prop_names_with_parent_reference_are_rejected(
        prefix in "[a-z0-9]{0,8}",
        suffix in "[a-z0-9]{0,8}",
    ) {
        let name = format!("{}..{}", prefix, suffix);
        prop_assert!(!NameValidator::validate(&name));
    }

    #[test]
    fn prop_names_with_forbidden_characters_are_rejected(
        prefix in "[a-z0-9]{0,8}",
        forbidden in "[/\\\\:*?\"<>| ]",
        suffix in "[a-z0-9]{0,8}",
    ) {
        let name = format!("{}{}{}", prefix, forbidden, suffix);
        prop_assert!(!NameValidator::validate(&name));
    }

    #[test]
    fn prop_planned_entries_stay_inside_root(raw in entry_name_strategy()) {
        match ArchiveIngestor::plan_entry(&raw) {
            Ok(Some(path)) => {
                prop_assert!(!path.is_empty());
                prop_assert!(!path.starts_with('/'));
                prop_assert!(!path.contains('\\'));
                prop_assert!(path.split('/').all(|s| !s.is_empty() && s != "." && s != ".."));
            }
            Ok(None) => {}
            Err(ArchiveError::PathEscape { entry }) => prop_assert_eq!(entry, raw),
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn prop_leading_parent_always_escapes(rest in "[a-z0-9]{1,8}(/[a-z0-9]{1,8}){0,3}") {
        let raw = format!("../{}", rest);
        let is_escape = matches!(
            ArchiveIngestor::plan_entry(&raw),
            Err(ArchiveError::PathEscape { .. })
        );
        prop_assert!(is_escape);
    }
}
