//! Validation of untrusted path components
//!
//! Artifact names and versions end up interpolated into filesystem paths and
//! object keys, so they are checked against a strict allow-list before any
//! directory is created or any request is issued.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Allowed characters for a single path component
static SAFE_COMPONENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-_.]+$").expect("Invalid safe component regex"));

/// Validator for artifact names and versions
pub struct NameValidator;

impl NameValidator {
    /// Returns `true` when `value` can be used as a single path component.
    ///
    /// Rejects empty strings, anything outside `[A-Za-z0-9._-]`, any string
    /// containing `..`, the current-directory marker `.`, and rooted paths.
    pub fn validate(value: &str) -> bool {
        if value.is_empty() || value == "." || value.contains("..") {
            return false;
        }

        if value.starts_with('/') || value.starts_with('\\') || Path::new(value).is_absolute() {
            return false;
        }

        SAFE_COMPONENT_REGEX.is_match(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_names_and_versions() {
        for value in ["acme", "my-remote", "shell_app", "1.2.3", "2.0.0-beta.1", "v1", "a"] {
            assert!(NameValidator::validate(value), "expected {value:?} to be accepted");
        }
    }

    #[test]
    fn test_rejects_traversal() {
        for value in ["..", "../etc", "a..b", "1..2", "...", "."] {
            assert!(!NameValidator::validate(value), "expected {value:?} to be rejected");
        }
    }

    #[test]
    fn test_rejects_rooted_and_separated_paths() {
        for value in ["/etc", "\\share", "a/b", "a\\b", "C:", "C:\\temp"] {
            assert!(!NameValidator::validate(value), "expected {value:?} to be rejected");
        }
    }

    #[test]
    fn test_rejects_empty_and_unsafe_characters() {
        for value in ["", " ", "name with space", "semi;colon", "tab\t", "newline\n", "ünïcode"] {
            assert!(!NameValidator::validate(value), "expected {value:?} to be rejected");
        }
    }
}
