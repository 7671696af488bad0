use axum::extract::Multipart;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::posts::models::PostCard;
use crate::shared::constants::ALLOWED_IMAGE_TYPES;
use crate::shared::types::FieldErrors;

/// Textual format of the `pub_date` field (HTML datetime-local input)
pub const PUB_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// The submitted field values as entered, kept around so an invalid form
/// re-renders with what the user typed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostFormValues {
    pub title: String,
    pub text: String,
    pub pub_date: String,
    /// Selected category id, empty for none
    pub category: String,
    /// Selected location id, empty for none
    pub location: String,
    pub is_published: bool,
    /// Relative media path of the already-stored image, on edit
    pub current_image: Option<String>,
}

impl PostFormValues {
    /// Prefill from an existing post for the edit form.
    pub fn from_card(card: &PostCard) -> Self {
        Self {
            title: card.title.clone(),
            text: card.text.clone(),
            pub_date: card.pub_date.format(PUB_DATE_FORMAT).to_string(),
            category: card.category_id.map(|id| id.to_string()).unwrap_or_default(),
            location: card.location_id.map(|id| id.to_string()).unwrap_or_default(),
            is_published: card.is_published,
            current_image: card.image.clone(),
        }
    }
}

/// An image file received alongside the form fields.
#[derive(Debug)]
pub struct UploadedImage {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Raw post form input collected from a multipart body.
#[derive(Debug, Default)]
pub struct PostFormData {
    pub values: PostFormValues,
    pub image: Option<UploadedImage>,
}

/// A fully validated post mutation, ready to persist. The author is never
/// part of the draft; handlers stamp it from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub is_published: bool,
}

impl PostFormData {
    /// Drain a multipart request into raw form data. Transport-level
    /// failures are bad requests; field-level problems are left for
    /// [`validate`](Self::validate).
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })? {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "title" => form.values.title = read_text(field).await?,
                "text" => form.values.text = read_text(field).await?,
                "pub_date" => form.values.pub_date = read_text(field).await?,
                "category" => form.values.category = read_text(field).await?,
                "location" => form.values.location = read_text(field).await?,
                "is_published" => {
                    let value = read_text(field).await?;
                    form.values.is_published =
                        value == "on" || value == "true" || value == "1";
                }
                "image" => {
                    let filename = field.file_name().map(str::to_string).unwrap_or_default();
                    let content_type = field
                        .content_type()
                        .map(str::to_string)
                        .unwrap_or_else(|| "application/octet-stream".to_string());
                    let data = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read image data: {}", e))
                    })?;

                    // Browsers send an empty file part when nothing was picked
                    if !filename.is_empty() && !data.is_empty() {
                        form.image = Some(UploadedImage {
                            filename,
                            content_type,
                            data: data.to_vec(),
                        });
                    }
                }
                _ => {
                    tracing::debug!("Ignoring unknown field: {}", name);
                }
            }
        }

        Ok(form)
    }

    /// Syntactic validation: required fields, the `pub_date` format, id
    /// shapes and image constraints. Reference existence is checked by the
    /// handler against the database afterwards.
    pub fn validate(&self, max_image_bytes: usize) -> Result<PostDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = self.values.title.trim();
        if title.is_empty() {
            errors.insert("title".to_string(), "This field is required.".to_string());
        } else if title.chars().count() > 256 {
            errors.insert(
                "title".to_string(),
                "Ensure this value has at most 256 characters.".to_string(),
            );
        }

        let text = self.values.text.trim();
        if text.is_empty() {
            errors.insert("text".to_string(), "This field is required.".to_string());
        }

        let pub_date = NaiveDateTime::parse_from_str(self.values.pub_date.trim(), PUB_DATE_FORMAT)
            .map(|naive| Utc.from_utc_datetime(&naive));
        if pub_date.is_err() {
            errors.insert(
                "pub_date".to_string(),
                "Enter a valid date/time in YYYY-MM-DDThh:mm format.".to_string(),
            );
        }

        let category_id = parse_optional_id(&self.values.category).unwrap_or_else(|_| {
            errors.insert(
                "category".to_string(),
                "Select a valid choice.".to_string(),
            );
            None
        });

        let location_id = parse_optional_id(&self.values.location).unwrap_or_else(|_| {
            errors.insert(
                "location".to_string(),
                "Select a valid choice.".to_string(),
            );
            None
        });

        if let Some(image) = &self.image {
            if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
                errors.insert(
                    "image".to_string(),
                    "Upload a valid image (jpeg, png, gif or webp).".to_string(),
                );
            } else if image.data.len() > max_image_bytes {
                errors.insert(
                    "image".to_string(),
                    format!("Image exceeds the maximum size of {} bytes.", max_image_bytes),
                );
            }
        }

        match pub_date {
            Ok(pub_date) if errors.is_empty() => Ok(PostDraft {
                title: title.to_string(),
                text: text.to_string(),
                pub_date,
                category_id,
                location_id,
                is_published: self.values.is_published,
            }),
            _ => Err(errors),
        }
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read form field: {}", e)))
}

fn parse_optional_id(raw: &str) -> Result<Option<Uuid>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(raw).map(Some).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{faker::lorem::en::Paragraph, Fake};

    fn valid_form() -> PostFormData {
        PostFormData {
            values: PostFormValues {
                title: "A walk in the park".to_string(),
                text: Paragraph(1..3).fake(),
                pub_date: "2024-03-05T14:30".to_string(),
                category: Uuid::new_v4().to_string(),
                location: String::new(),
                is_published: true,
                current_image: None,
            },
            image: None,
        }
    }

    #[test]
    fn test_valid_form_parses() {
        let draft = valid_form().validate(1024).expect("form is valid");
        assert_eq!(draft.title, "A walk in the park");
        assert_eq!(
            draft.pub_date.format(PUB_DATE_FORMAT).to_string(),
            "2024-03-05T14:30"
        );
        assert!(draft.category_id.is_some());
        assert_eq!(draft.location_id, None);
        assert!(draft.is_published);
    }

    #[test]
    fn test_missing_title_is_a_field_error() {
        let mut form = valid_form();
        form.values.title = "   ".to_string();
        let errors = form.validate(1024).unwrap_err();
        assert!(errors.contains_key("title"));
        assert!(!errors.contains_key("text"));
    }

    #[test]
    fn test_bad_pub_date_is_a_field_error() {
        let mut form = valid_form();
        form.values.pub_date = "05.03.2024 14:30".to_string();
        let errors = form.validate(1024).unwrap_err();
        assert!(errors.contains_key("pub_date"));
    }

    #[test]
    fn test_malformed_category_id_is_a_field_error() {
        let mut form = valid_form();
        form.values.category = "not-a-uuid".to_string();
        let errors = form.validate(1024).unwrap_err();
        assert!(errors.contains_key("category"));
    }

    #[test]
    fn test_empty_references_are_none() {
        let mut form = valid_form();
        form.values.category = String::new();
        let draft = form.validate(1024).expect("form is valid");
        assert_eq!(draft.category_id, None);
    }

    #[test]
    fn test_image_type_and_size_checks() {
        let mut form = valid_form();
        form.image = Some(UploadedImage {
            filename: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: vec![0; 16],
        });
        let errors = form.validate(1024).unwrap_err();
        assert!(errors.contains_key("image"));

        let mut form = valid_form();
        form.image = Some(UploadedImage {
            filename: "big.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0; 2048],
        });
        let errors = form.validate(1024).unwrap_err();
        assert!(errors.contains_key("image"));
    }

    #[test]
    fn test_oversize_title_is_a_field_error() {
        let mut form = valid_form();
        form.values.title = "x".repeat(257);
        let errors = form.validate(1024).unwrap_err();
        assert!(errors.contains_key("title"));
    }
}
