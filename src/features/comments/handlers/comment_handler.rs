use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use minijinja::context;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::templates::render;
use crate::features::auth::guards::RequireLogin;
use crate::features::auth::model::CurrentUser;
use crate::features::comments::dtos::CommentForm;
use crate::features::comments::models::Comment;
use crate::features::comments::services::CommentService;
use crate::features::posts::query::is_publicly_visible;
use crate::features::posts::services::PostService;

pub struct CommentsState {
    pub comments: Arc<CommentService>,
    pub posts: Arc<PostService>,
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} '{}' not found", what, raw)))
}

/// Add a comment to a visible post and jump to it on the detail page.
///
/// The parent post's visibility is re-checked here: a hidden or scheduled
/// post only accepts comments from its own author.
pub async fn add_comment(
    State(state): State<Arc<CommentsState>>,
    RequireLogin(user): RequireLogin,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let post_id = parse_id(&post_id, "Post")?;
    let post = state
        .posts
        .get_card(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

    let is_author = user.is_author_of(post.author_id);
    if !is_author
        && !is_publicly_visible(
            post.is_published,
            post.pub_date,
            post.category_is_published,
            Utc::now(),
        )
    {
        return Err(AppError::NotFound(format!("Post {} not found", post_id)));
    }

    let errors = form.field_errors();
    if !errors.is_empty() {
        // Show the detail page again with the rejected form inline
        let comments = state.comments.list_for_post(post_id).await?;
        let body = render(
            "blog/detail.html",
            context! {
                user => user,
                post => post,
                is_author => is_author,
                comments => comments,
                comment_form => form,
                comment_errors => errors,
            },
        )?;
        return Ok(body.into_response());
    }

    let comment = state
        .comments
        .create(post_id, user.id, form.text_value())
        .await?;

    Ok(Redirect::to(&format!("/posts/{}/#comment_{}", post_id, comment.id)).into_response())
}

/// Show the comment edit form. Non-authors are sent to the detail page.
pub async fn edit_comment_page(
    State(state): State<Arc<CommentsState>>,
    RequireLogin(user): RequireLogin,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Response> {
    let comment = match lookup_for_author(&state, &post_id, &comment_id, &user).await? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect),
    };

    let form = CommentForm {
        text: comment.text.clone(),
    };
    render_comment_form(user, &comment, form, Default::default(), false)
}

/// Apply a comment edit and jump back to it
pub async fn edit_comment(
    State(state): State<Arc<CommentsState>>,
    RequireLogin(user): RequireLogin,
    Path((post_id, comment_id)): Path<(String, String)>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let comment = match lookup_for_author(&state, &post_id, &comment_id, &user).await? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect),
    };

    let errors = form.field_errors();
    if !errors.is_empty() {
        return render_comment_form(user, &comment, form, errors, false);
    }

    state.comments.update(comment.id, form.text_value()).await?;

    Ok(Redirect::to(&format!(
        "/posts/{}/#comment_{}",
        comment.post_id, comment.id
    ))
    .into_response())
}

/// Deletion confirmation page
pub async fn delete_comment_page(
    State(state): State<Arc<CommentsState>>,
    RequireLogin(user): RequireLogin,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Response> {
    let comment = match lookup_for_author(&state, &post_id, &comment_id, &user).await? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect),
    };

    let form = CommentForm {
        text: comment.text.clone(),
    };
    render_comment_form(user, &comment, form, Default::default(), true)
}

/// Delete a comment and return to the post
pub async fn delete_comment(
    State(state): State<Arc<CommentsState>>,
    RequireLogin(user): RequireLogin,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Response> {
    let comment = match lookup_for_author(&state, &post_id, &comment_id, &user).await? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect),
    };

    state.comments.delete(comment.id).await?;

    Ok(Redirect::to(&format!("/posts/{}/", comment.post_id)).into_response())
}

/// Lookup half of the ownership protocol. The comment must belong to the
/// post named in the URL; a non-author resolves to the silent redirect.
async fn lookup_for_author(
    state: &CommentsState,
    raw_post_id: &str,
    raw_comment_id: &str,
    user: &CurrentUser,
) -> Result<std::result::Result<Comment, Response>> {
    let post_id = parse_id(raw_post_id, "Post")?;
    let comment_id = parse_id(raw_comment_id, "Comment")?;

    let comment = state
        .comments
        .get(comment_id, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

    if !user.is_author_of(comment.author_id) {
        return Ok(Err(
            Redirect::to(&format!("/posts/{}/", post_id)).into_response()
        ));
    }

    Ok(Ok(comment))
}

fn render_comment_form(
    user: CurrentUser,
    comment: &Comment,
    form: CommentForm,
    errors: crate::shared::types::FieldErrors,
    deleting: bool,
) -> Result<Response> {
    let body = render(
        "blog/comment.html",
        context! {
            user => user,
            post_id => comment.post_id,
            comment_id => comment.id,
            form => form,
            errors => errors,
            deleting => deleting,
        },
    )?;
    Ok(body.into_response())
}
