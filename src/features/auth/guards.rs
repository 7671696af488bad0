//! Viewer-identity guards.
//!
//! `RequireLogin` is the explicit gate in front of every auth-required
//! handler: an anonymous request is answered with a redirect to the login
//! page carrying the original path in `?next=`.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::features::auth::model::CurrentUser;

/// The viewer, when logged in. Anonymous requests resolve to `None`.
///
/// # Example
/// ```ignore
/// pub async fn handler(OptionalUser(user): OptionalUser) { ... }
/// ```
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Guard for auth-required routes.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireLogin(user): RequireLogin) { ... }
/// ```
pub struct RequireLogin(pub CurrentUser);

/// Rejection issued when an anonymous request hits a guarded route.
pub struct LoginRedirect {
    next: String,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        let target = format!("/auth/login/?next={}", urlencoding::encode(&self.next));
        Redirect::to(&target).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(RequireLogin)
            .ok_or_else(|| LoginRedirect {
                next: parts.uri.path().to_string(),
            })
    }
}
