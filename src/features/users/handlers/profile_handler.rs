use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;

use crate::core::error::{AppError, Result};
use crate::core::templates::render;
use crate::features::auth::guards::{OptionalUser, RequireLogin};
use crate::features::posts::query::PostScope;
use crate::features::posts::services::PostService;
use crate::features::users::dtos::ProfileEditForm;
use crate::features::users::services::UserService;
use crate::shared::types::PageQuery;

pub struct ProfileState {
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
}

/// A user's post listing. The owner sees every post they wrote, everyone
/// else only the publicly visible ones.
pub async fn profile(
    State(state): State<Arc<ProfileState>>,
    Path(username): Path<String>,
    OptionalUser(viewer): OptionalUser,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let owner = state
        .users
        .get_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))?;

    let is_owner = viewer.as_ref().is_some_and(|v| v.id == owner.id);
    let scope = PostScope::Profile {
        user_id: owner.id,
        include_hidden: is_owner,
    };
    let page = state.posts.page_of_posts(&scope, query.number()).await?;

    let body = render(
        "blog/profile.html",
        context! {
            user => viewer,
            profile => owner,
            is_owner => is_owner,
            page => page,
        },
    )?;
    Ok(body.into_response())
}

/// Show the own-profile edit form
pub async fn edit_profile_page(RequireLogin(user): RequireLogin) -> Result<Response> {
    let form = ProfileEditForm::from(&user);
    let body = render(
        "blog/user.html",
        context! {
            user => user,
            form => form,
            errors => context! {},
        },
    )?;
    Ok(body.into_response())
}

/// Apply a profile edit and return to the profile page
pub async fn edit_profile(
    State(state): State<Arc<ProfileState>>,
    RequireLogin(user): RequireLogin,
    Form(form): Form<ProfileEditForm>,
) -> Result<Response> {
    let mut errors = form.field_errors();

    if !errors.contains_key("username")
        && form.username != user.username
        && state
            .users
            .username_taken(&form.username, Some(user.id))
            .await?
    {
        errors.insert(
            "username".to_string(),
            "A user with that username already exists.".to_string(),
        );
    }

    if !errors.is_empty() {
        let body = render(
            "blog/user.html",
            context! {
                user => user,
                form => form,
                errors => errors,
            },
        )?;
        return Ok(body.into_response());
    }

    let updated = state
        .users
        .update_profile(
            user.id,
            &form.username,
            &form.email,
            form.first_name_value(),
            form.last_name_value(),
        )
        .await?;

    Ok(Redirect::to(&format!("/profile/{}/", updated.username)).into_response())
}
