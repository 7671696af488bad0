use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use minijinja::context;

use crate::core::error::Result;
use crate::core::templates::render;
use crate::features::auth::guards::OptionalUser;
use crate::features::categories::services::CategoryService;
use crate::features::posts::query::PostScope;
use crate::features::posts::services::PostService;
use crate::shared::types::PageQuery;

pub struct CategoryState {
    pub categories: Arc<CategoryService>,
    pub posts: Arc<PostService>,
}

/// Public posts of one published category
pub async fn category_posts(
    State(state): State<Arc<CategoryState>>,
    Path(slug): Path<String>,
    OptionalUser(viewer): OptionalUser,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let category = state.categories.get_published_by_slug(&slug).await?;

    let scope = PostScope::Category {
        category_id: category.id,
    };
    let page = state.posts.page_of_posts(&scope, query.number()).await?;

    let body = render(
        "blog/category.html",
        context! {
            user => viewer,
            category => category,
            page => page,
        },
    )?;
    Ok(body.into_response())
}
