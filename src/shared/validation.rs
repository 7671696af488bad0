use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationErrors;

use crate::shared::types::FieldErrors;

lazy_static! {
    /// Regex for validating usernames
    /// Must start with a letter or underscore and contain only alphanumeric characters and underscores
    /// - Valid: "john_doe", "user123", "_admin", "JohnDoe"
    /// - Invalid: "123user", "-user", "user-name", "user name"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();

    /// Regex for validating category slugs
    /// Must be lowercase alphanumeric with single hyphens
    /// - Valid: "travel-notes", "cat123", "day-to-day"
    /// - Invalid: "-cat", "cat-", "cat--name", "Cat", "cat_name"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Flatten derive-produced validation errors into the per-field map the
/// form templates render. Only the first message per field is kept.
pub fn collect_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut map = FieldErrors::new();
    for (field, field_errors) in errors.field_errors() {
        if let Some(first) = field_errors.first() {
            let message = first
                .message
                .clone()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Enter a valid value.".to_string());
            map.insert(field.to_string(), message);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_regex_valid() {
        assert!(USERNAME_REGEX.is_match("john_doe"));
        assert!(USERNAME_REGEX.is_match("user123"));
        assert!(USERNAME_REGEX.is_match("_admin"));
        assert!(USERNAME_REGEX.is_match("JohnDoe"));
    }

    #[test]
    fn test_username_regex_invalid() {
        assert!(!USERNAME_REGEX.is_match("123user")); // starts with digit
        assert!(!USERNAME_REGEX.is_match("-user")); // starts with hyphen
        assert!(!USERNAME_REGEX.is_match("user-name")); // hyphen
        assert!(!USERNAME_REGEX.is_match("user name")); // space
        assert!(!USERNAME_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("travel-notes"));
        assert!(SLUG_REGEX.is_match("cat123"));
        assert!(SLUG_REGEX.is_match("a"));
        assert!(SLUG_REGEX.is_match("day-to-day"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-cat")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("cat-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("cat--name")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Cat")); // uppercase
        assert!(!SLUG_REGEX.is_match("cat_name")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
    }
}
