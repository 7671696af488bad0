use serde::{Deserialize, Serialize};

use crate::shared::types::FieldErrors;

/// The one-field comment form.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.text.trim().is_empty() {
            errors.insert("text".to_string(), "This field is required.".to_string());
        }
        errors
    }

    pub fn text_value(&self) -> &str {
        self.text.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_is_valid() {
        let form = CommentForm {
            text: "  nice post  ".to_string(),
        };
        assert!(form.field_errors().is_empty());
        assert_eq!(form.text_value(), "nice post");
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let form = CommentForm {
            text: "   ".to_string(),
        };
        assert!(form.field_errors().contains_key("text"));
    }
}
