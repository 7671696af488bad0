use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::shared::validation::SLUG_REGEX;

const CATEGORY_SELECT: &str = r#"
    SELECT id, title, slug, description, is_published, created_at
    FROM categories
"#;

/// Service for category reads
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a published category by slug. Unpublished and unknown slugs
    /// are both `NotFound`; malformed slugs skip the database round trip.
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Category> {
        if !SLUG_REGEX.is_match(slug) {
            return Err(AppError::NotFound(format!("Category '{}' not found", slug)));
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            "{} WHERE slug = $1 AND is_published = TRUE",
            CATEGORY_SELECT
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by slug: {:?}", e);
            AppError::Database(e)
        })?;

        category.ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    /// All categories, for the post form's choice list.
    pub async fn list_all(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(&format!("{} ORDER BY title", CATEGORY_SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check category: {:?}", e);
                AppError::Database(e)
            })
    }
}
