use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::types::FieldErrors;
use crate::shared::validation::{collect_errors, USERNAME_REGEX};

/// Login credentials. `next` carries the path to return to after login.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

impl LoginForm {
    /// The post-login redirect target, when it is a safe local path.
    pub fn safe_next(&self) -> Option<&str> {
        self.next
            .as_deref()
            .filter(|n| n.starts_with('/') && !n.starts_with("//"))
    }
}

/// New account form. Password policy: at least 8 characters, not entirely
/// numeric, entered twice.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct RegistrationForm {
    #[validate(
        length(min = 1, max = 150, message = "This field is required."),
        regex(
            path = *USERNAME_REGEX,
            message = "Enter a valid username: letters, digits and underscores only, not starting with a digit."
        )
    )]
    pub username: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    pub password1: String,
    pub password2: String,
}

impl RegistrationForm {
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => collect_errors(&e),
        };

        if self.password1.len() < 8 {
            errors.insert(
                "password1".to_string(),
                "This password is too short. It must contain at least 8 characters.".to_string(),
            );
        } else if self.password1.chars().all(|c| c.is_ascii_digit()) {
            errors.insert(
                "password1".to_string(),
                "This password is entirely numeric.".to_string(),
            );
        }

        if self.password1 != self.password2 {
            errors.insert(
                "password2".to_string(),
                "The two password fields didn't match.".to_string(),
            );
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            username: "john_doe".to_string(),
            email: "john@example.com".to_string(),
            password1: "correct horse".to_string(),
            password2: "correct horse".to_string(),
        }
    }

    #[test]
    fn test_valid_registration_has_no_errors() {
        assert!(valid_form().field_errors().is_empty());
    }

    #[test]
    fn test_invalid_email() {
        let form = RegistrationForm {
            email: "not-an-email".to_string(),
            ..valid_form()
        };
        assert!(form.field_errors().contains_key("email"));
    }

    #[test]
    fn test_invalid_username() {
        let form = RegistrationForm {
            username: "123john".to_string(),
            ..valid_form()
        };
        assert!(form.field_errors().contains_key("username"));
    }

    #[test]
    fn test_short_password() {
        let form = RegistrationForm {
            password1: "short".to_string(),
            password2: "short".to_string(),
            ..valid_form()
        };
        assert!(form.field_errors().contains_key("password1"));
    }

    #[test]
    fn test_numeric_password() {
        let form = RegistrationForm {
            password1: "1234567890".to_string(),
            password2: "1234567890".to_string(),
            ..valid_form()
        };
        assert!(form.field_errors().contains_key("password1"));
    }

    #[test]
    fn test_password_mismatch() {
        let form = RegistrationForm {
            password2: "something else".to_string(),
            ..valid_form()
        };
        assert!(form.field_errors().contains_key("password2"));
    }

    #[test]
    fn test_login_safe_next() {
        let mut form = LoginForm {
            next: Some("/posts/new/".to_string()),
            ..Default::default()
        };
        assert_eq!(form.safe_next(), Some("/posts/new/"));

        form.next = Some("https://evil.example".to_string());
        assert_eq!(form.safe_next(), None);

        form.next = Some("//evil.example".to_string());
        assert_eq!(form.safe_next(), None);
    }
}
