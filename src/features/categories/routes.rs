use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::categories::handlers::{category_handler, CategoryState};
use crate::features::categories::services::CategoryService;
use crate::features::posts::services::PostService;

/// Create routes for category listing pages
pub fn routes(categories: Arc<CategoryService>, posts: Arc<PostService>) -> Router {
    let state = Arc::new(CategoryState { categories, posts });

    Router::new()
        .route("/category/{slug}/", get(category_handler::category_posts))
        .with_state(state)
}
