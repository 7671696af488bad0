use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;
use serde::Deserialize;
use tower_sessions::Session;

use crate::core::error::{AppError, Result};
use crate::core::templates::render;
use crate::features::auth::dtos::{LoginForm, RegistrationForm};
use crate::features::auth::guards::OptionalUser;
use crate::features::auth::services::AuthService;
use crate::features::users::services::UserService;
use crate::shared::constants::SESSION_USER_KEY;

pub struct AuthState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Show the login form
pub async fn login_page(
    OptionalUser(user): OptionalUser,
    Query(query): Query<LoginQuery>,
) -> Result<Response> {
    let page = render(
        "registration/login.html",
        context! {
            user => user,
            form => LoginForm::default(),
            next => query.next,
            login_failed => false,
        },
    )?;
    Ok(page.into_response())
}

/// Verify credentials and open a session
pub async fn login(
    State(state): State<Arc<AuthState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.auth.authenticate(&form.username, &form.password).await? {
        Some(account) => {
            session
                .insert(SESSION_USER_KEY, account.id)
                .await
                .map_err(|e| AppError::Internal(format!("Session store failed: {}", e)))?;
            tracing::info!("User {} logged in", account.username);

            let target = match form.safe_next() {
                Some(next) => next.to_string(),
                None => format!("/profile/{}/", account.username),
            };
            Ok(Redirect::to(&target).into_response())
        }
        None => {
            tracing::debug!("Failed login attempt for {}", form.username);
            let next = form.next.clone();
            let page = render(
                "registration/login.html",
                context! {
                    user => Option::<()>::None,
                    form => form,
                    next => next,
                    login_failed => true,
                },
            )?;
            Ok(page.into_response())
        }
    }
}

/// Close the session
pub async fn logout(session: Session) -> Result<Response> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Session flush failed: {}", e)))?;
    Ok(Redirect::to("/").into_response())
}

/// Show the registration form
pub async fn registration_page(OptionalUser(user): OptionalUser) -> Result<Response> {
    let page = render(
        "registration/registration_form.html",
        context! {
            user => user,
            form => RegistrationForm::default(),
            errors => context! {},
        },
    )?;
    Ok(page.into_response())
}

/// Create a new account and send the user to the login page
pub async fn register(
    State(state): State<Arc<AuthState>>,
    OptionalUser(user): OptionalUser,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    let mut errors = form.field_errors();

    if !errors.contains_key("username") && state.users.username_taken(&form.username, None).await? {
        errors.insert(
            "username".to_string(),
            "A user with that username already exists.".to_string(),
        );
    }

    if !errors.is_empty() {
        let page = render(
            "registration/registration_form.html",
            context! {
                user => user,
                form => form,
                errors => errors,
            },
        )?;
        return Ok(page.into_response());
    }

    let password_hash = AuthService::hash_password(&form.password1)?;
    let account = state
        .users
        .create(&form.username, &form.email, &password_hash)
        .await?;
    tracing::info!("Registered new user {}", account.username);

    Ok(Redirect::to("/auth/login/").into_response())
}
