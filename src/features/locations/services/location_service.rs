use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::locations::models::Location;

/// Service for location reads
pub struct LocationService {
    pool: PgPool,
}

impl LocationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All locations, for the post form's choice list.
    pub async fn list_all(&self) -> Result<Vec<Location>> {
        sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, is_published, created_at
            FROM locations
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list locations: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM locations WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check location: {:?}", e);
                AppError::Database(e)
            })
    }
}
