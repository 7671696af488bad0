use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::comments::models::{Comment, CommentView};

/// Service for comment storage
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Comments of one post, oldest first.
    pub async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
        sqlx::query_as::<_, CommentView>(
            r#"
            SELECT cm.id, cm.author_id, u.username AS author_username, cm.text, cm.created_at
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            WHERE cm.post_id = $1
            ORDER BY cm.created_at ASC, cm.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Look a comment up by id *and* parent post; a mismatched pair does
    /// not resolve.
    pub async fn get(&self, comment_id: Uuid, post_id: Uuid) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created_at
            FROM comments
            WHERE id = $1 AND post_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get comment: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn create(&self, post_id: Uuid, author_id: Uuid, text: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Created comment {} on post {}", comment.id, post_id);
        Ok(comment)
    }

    pub async fn update(&self, id: Uuid, text: &str) -> Result<()> {
        sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(id)
            .bind(text)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update comment: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Updated comment {}", id);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete comment: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Deleted comment {}", id);
        Ok(())
    }
}
