use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for category
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
