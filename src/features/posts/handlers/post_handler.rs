use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use minijinja::context;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::templates::render;
use crate::features::auth::guards::{OptionalUser, RequireLogin};
use crate::features::auth::model::CurrentUser;
use crate::features::categories::services::CategoryService;
use crate::features::comments::dtos::CommentForm;
use crate::features::comments::services::CommentService;
use crate::features::locations::services::LocationService;
use crate::features::posts::dtos::{PostDraft, PostFormData, PostFormValues};
use crate::features::posts::models::PostCard;
use crate::features::posts::query::{is_publicly_visible, PostScope};
use crate::features::posts::services::PostService;
use crate::modules::storage::MediaStore;
use crate::shared::types::{FieldErrors, PageQuery};

pub struct PostsState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub categories: Arc<CategoryService>,
    pub locations: Arc<LocationService>,
    pub media: Arc<MediaStore>,
}

fn parse_post_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Post '{}' not found", raw)))
}

/// The public feed
pub async fn index(
    State(state): State<Arc<PostsState>>,
    OptionalUser(viewer): OptionalUser,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let page = state
        .posts
        .page_of_posts(&PostScope::PublicFeed, query.number())
        .await?;

    let body = render(
        "blog/index.html",
        context! {
            user => viewer,
            page => page,
        },
    )?;
    Ok(body.into_response())
}

/// One post with its comments. Invisible posts 404 for everyone except
/// their author.
pub async fn post_detail(
    State(state): State<Arc<PostsState>>,
    Path(id): Path<String>,
    OptionalUser(viewer): OptionalUser,
) -> Result<Response> {
    let id = parse_post_id(&id)?;
    let post = state
        .posts
        .get_card(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    let is_author = viewer.as_ref().is_some_and(|v| v.is_author_of(post.author_id));
    if !is_author
        && !is_publicly_visible(
            post.is_published,
            post.pub_date,
            post.category_is_published,
            Utc::now(),
        )
    {
        return Err(AppError::NotFound(format!("Post {} not found", id)));
    }

    let comments = state.comments.list_for_post(id).await?;

    let body = render(
        "blog/detail.html",
        context! {
            user => viewer,
            post => post,
            is_author => is_author,
            comments => comments,
            comment_form => CommentForm::default(),
            comment_errors => context! {},
        },
    )?;
    Ok(body.into_response())
}

/// Show the empty post form
pub async fn create_post_page(
    State(state): State<Arc<PostsState>>,
    RequireLogin(user): RequireLogin,
) -> Result<Response> {
    render_post_form(
        &state,
        user,
        PostFormValues::default(),
        FieldErrors::new(),
        None,
        false,
    )
    .await
}

/// Create a post and land on the author's profile
pub async fn create_post(
    State(state): State<Arc<PostsState>>,
    RequireLogin(user): RequireLogin,
    mut multipart: Multipart,
) -> Result<Response> {
    let form = PostFormData::from_multipart(&mut multipart).await?;

    match validate_against_references(&state, &form).await? {
        Ok(draft) => {
            let image = match &form.image {
                Some(upload) => Some(
                    state
                        .media
                        .save_post_image(&upload.content_type, &upload.data)
                        .await?,
                ),
                None => None,
            };

            state
                .posts
                .create(user.id, &draft, image.as_deref())
                .await?;
            Ok(Redirect::to(&format!("/profile/{}/", user.username)).into_response())
        }
        Err(errors) => render_post_form(&state, user, form.values, errors, None, false).await,
    }
}

/// Show the edit form, pre-filled. Non-authors are sent to the detail page.
pub async fn edit_post_page(
    State(state): State<Arc<PostsState>>,
    RequireLogin(user): RequireLogin,
    Path(id): Path<String>,
) -> Result<Response> {
    let post = match lookup_for_author(&state, &id, &user).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };

    let values = PostFormValues::from_card(&post);
    render_post_form(&state, user, values, FieldErrors::new(), Some(post.id), false).await
}

/// Apply an edit and return to the post
pub async fn edit_post(
    State(state): State<Arc<PostsState>>,
    RequireLogin(user): RequireLogin,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Response> {
    let post = match lookup_for_author(&state, &id, &user).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };

    let mut form = PostFormData::from_multipart(&mut multipart).await?;
    form.values.current_image = post.image.clone();

    match validate_against_references(&state, &form).await? {
        Ok(draft) => {
            // A fresh upload replaces the stored image, otherwise keep it
            let image = match &form.image {
                Some(upload) => Some(
                    state
                        .media
                        .save_post_image(&upload.content_type, &upload.data)
                        .await?,
                ),
                None => post.image.clone(),
            };

            state.posts.update(post.id, &draft, image.as_deref()).await?;
            Ok(Redirect::to(&format!("/posts/{}/", post.id)).into_response())
        }
        Err(errors) => {
            render_post_form(&state, user, form.values, errors, Some(post.id), false).await
        }
    }
}

/// Deletion confirmation page
pub async fn delete_post_page(
    State(state): State<Arc<PostsState>>,
    RequireLogin(user): RequireLogin,
    Path(id): Path<String>,
) -> Result<Response> {
    let post = match lookup_for_author(&state, &id, &user).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };

    let values = PostFormValues::from_card(&post);
    render_post_form(&state, user, values, FieldErrors::new(), Some(post.id), true).await
}

/// Delete a post and land on the author's profile
pub async fn delete_post(
    State(state): State<Arc<PostsState>>,
    RequireLogin(user): RequireLogin,
    Path(id): Path<String>,
) -> Result<Response> {
    let post = match lookup_for_author(&state, &id, &user).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };

    state.posts.delete(post.id).await?;
    Ok(Redirect::to(&format!("/profile/{}/", user.username)).into_response())
}

/// Lookup half of the ownership protocol: a missing post is `NotFound`, a
/// post owned by someone else resolves to the silent redirect the caller
/// returns as-is.
async fn lookup_for_author(
    state: &PostsState,
    raw_id: &str,
    user: &CurrentUser,
) -> Result<std::result::Result<PostCard, Response>> {
    let id = parse_post_id(raw_id)?;
    let post = state
        .posts
        .get_card(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    if !user.is_author_of(post.author_id) {
        return Ok(Err(
            Redirect::to(&format!("/posts/{}/", post.id)).into_response()
        ));
    }

    Ok(Ok(post))
}

/// Syntactic validation plus existence checks for the optional category and
/// location references.
async fn validate_against_references(
    state: &PostsState,
    form: &PostFormData,
) -> Result<std::result::Result<PostDraft, FieldErrors>> {
    let (draft, mut errors) = match form.validate(state.media.max_image_bytes()) {
        Ok(draft) => (Some(draft), FieldErrors::new()),
        Err(errors) => (None, errors),
    };

    if let Some(draft) = &draft {
        if let Some(category_id) = draft.category_id {
            if !state.categories.exists(category_id).await? {
                errors.insert("category".to_string(), "Select a valid choice.".to_string());
            }
        }
        if let Some(location_id) = draft.location_id {
            if !state.locations.exists(location_id).await? {
                errors.insert("location".to_string(), "Select a valid choice.".to_string());
            }
        }
    }

    match draft {
        Some(draft) if errors.is_empty() => Ok(Ok(draft)),
        _ => Ok(Err(errors)),
    }
}

async fn render_post_form(
    state: &PostsState,
    user: CurrentUser,
    values: PostFormValues,
    errors: FieldErrors,
    post_id: Option<Uuid>,
    deleting: bool,
) -> Result<Response> {
    let categories = state.categories.list_all().await?;
    let locations = state.locations.list_all().await?;

    let body = render(
        "blog/create.html",
        context! {
            user => user,
            form => values,
            errors => errors,
            categories => categories,
            locations => locations,
            post_id => post_id,
            deleting => deleting,
        },
    )?;
    Ok(body.into_response())
}
