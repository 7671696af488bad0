use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::auth::model::CurrentUser;
use crate::shared::types::FieldErrors;
use crate::shared::validation::{collect_errors, USERNAME_REGEX};

/// Own-profile edit form: names plus the same username/email rules as
/// registration.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct ProfileEditForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    #[serde(default)]
    pub first_name: String,

    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    #[serde(default)]
    pub last_name: String,

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
}

impl ProfileEditForm {
    pub fn field_errors(&self) -> FieldErrors {
        match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => collect_errors(&e),
        }
    }

    /// Empty name fields persist as NULL.
    pub fn first_name_value(&self) -> Option<&str> {
        Some(self.first_name.trim()).filter(|s| !s.is_empty())
    }

    pub fn last_name_value(&self) -> Option<&str> {
        Some(self.last_name.trim()).filter(|s| !s.is_empty())
    }
}

impl From<&CurrentUser> for ProfileEditForm {
    fn from(user: &CurrentUser) -> Self {
        Self {
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProfileEditForm {
        ProfileEditForm {
            first_name: "John".to_string(),
            last_name: String::new(),
            username: "john_doe".to_string(),
            email: "john@example.com".to_string(),
        }
    }

    #[test]
    fn test_valid_profile_edit() {
        let form = valid_form();
        assert!(form.field_errors().is_empty());
        assert_eq!(form.first_name_value(), Some("John"));
        assert_eq!(form.last_name_value(), None);
    }

    #[test]
    fn test_profile_edit_requires_username() {
        let form = ProfileEditForm {
            username: String::new(),
            ..valid_form()
        };
        assert!(form.field_errors().contains_key("username"));
    }

    #[test]
    fn test_profile_edit_rejects_bad_email() {
        let form = ProfileEditForm {
            email: "nope".to_string(),
            ..valid_form()
        };
        assert!(form.field_errors().contains_key("email"));
    }
}
