//! Input validation shared by the repositories and the GraphQL layer.

use crate::error::CoreError;

/// Reject empty or whitespace-only values for a required text field.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

/// Like [`require_non_blank`], but only when a value was supplied.
pub fn require_non_blank_if_present(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) => require_non_blank(field, v),
        None => Ok(()),
    }
}

/// Canonical form of a username: trimmed and lower-cased.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert_matches!(require_non_blank("title", ""), Err(CoreError::Validation(_)));
        assert_matches!(require_non_blank("title", "  \t"), Err(CoreError::Validation(_)));
        assert!(require_non_blank("title", "x").is_ok());
    }

    #[test]
    fn message_names_the_field() {
        let err = require_non_blank("username", " ").unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: username must not be blank");
    }

    #[test]
    fn absent_optional_values_pass() {
        assert!(require_non_blank_if_present("name", None).is_ok());
        assert_matches!(
            require_non_blank_if_present("name", Some("")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn usernames_are_lower_cased() {
        assert_eq!(normalize_username(" Alice "), "alice");
    }
}
