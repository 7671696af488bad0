use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::posts::dtos::PostDraft;
use crate::features::posts::models::PostCard;
use crate::features::posts::query::PostScope;
use crate::shared::constants::POSTS_PER_PAGE;
use crate::shared::types::{Page, PageWindow};

const POST_CARD_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.text, p.image, p.pub_date, p.is_published, p.created_at,
        p.author_id, u.username AS author_username,
        p.category_id, c.title AS category_title, c.slug AS category_slug,
        c.is_published AS category_is_published,
        p.location_id, l.name AS location_name, l.is_published AS location_is_published,
        (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

/// Ordering for every listing: newest first, insertion order on ties.
const POST_ORDERING: &str = "p.pub_date DESC, p.created_at ASC, p.id ASC";

/// Service for post storage and the composed listing queries
pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of posts for the given scope, annotated and ordered per the
    /// listing contract. A pure read; the requested page number clamps to
    /// the last valid page.
    pub async fn page_of_posts(&self, scope: &PostScope, requested: i64) -> Result<Page<PostCard>> {
        let filter = scope.filter();

        let count_sql = format!(
            "SELECT COUNT(*) FROM posts p LEFT JOIN categories c ON c.id = p.category_id WHERE {}",
            filter
        );
        let total: i64 = match scope.bind_id() {
            Some(id) => {
                sqlx::query_scalar(&count_sql)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
            }
            None => sqlx::query_scalar(&count_sql).fetch_one(&self.pool).await,
        }
        .map_err(|e| {
            tracing::error!("Failed to count posts: {:?}", e);
            AppError::Database(e)
        })?;

        let window = PageWindow::resolve(total, requested, POSTS_PER_PAGE);

        // `$1` is taken by the scope id when present
        let (limit_ph, offset_ph) = if scope.bind_id().is_some() {
            ("$2", "$3")
        } else {
            ("$1", "$2")
        };
        let list_sql = format!(
            "{} WHERE {} ORDER BY {} LIMIT {} OFFSET {}",
            POST_CARD_SELECT, filter, POST_ORDERING, limit_ph, offset_ph
        );

        let items = match scope.bind_id() {
            Some(id) => {
                sqlx::query_as::<_, PostCard>(&list_sql)
                    .bind(id)
                    .bind(window.limit())
                    .bind(window.offset())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as::<_, PostCard>(&list_sql)
                    .bind(window.limit())
                    .bind(window.offset())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| {
            tracing::error!("Failed to list posts: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(Page::new(window, items))
    }

    /// Fetch one post with its annotations, regardless of visibility.
    /// Callers apply the visibility gate for non-authors.
    pub async fn get_card(&self, id: Uuid) -> Result<Option<PostCard>> {
        sqlx::query_as::<_, PostCard>(&format!("{} WHERE p.id = $1", POST_CARD_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get post: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        draft: &PostDraft,
        image: Option<&str>,
    ) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, text, image, pub_date, is_published, author_id, category_id, location_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(image)
        .bind(draft.pub_date)
        .bind(draft.is_published)
        .bind(author_id)
        .bind(draft.category_id)
        .bind(draft.location_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Created post {} by user {}", id, author_id);
        Ok(id)
    }

    /// Overwrite a post's editable fields. `image` is the final value, so
    /// an edit that uploads nothing passes the existing path through.
    pub async fn update(&self, id: Uuid, draft: &PostDraft, image: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, text = $3, image = $4, pub_date = $5,
                is_published = $6, category_id = $7, location_id = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(image)
        .bind(draft.pub_date)
        .bind(draft.is_published)
        .bind(draft.category_id)
        .bind(draft.location_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Updated post {}", id);
        Ok(())
    }

    /// Delete a post; its comments go with it (`ON DELETE CASCADE`).
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete post: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Deleted post {}", id);
        Ok(())
    }
}
