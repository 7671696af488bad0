use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_http::request_id::{MakeRequestId, RequestId};
use tower_sessions::Session;
use tracing::Span;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::auth::model::CurrentUser;
use crate::features::users::services::UserService;
use crate::shared::constants::SESSION_USER_KEY;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

/// Resolve the session to a [`CurrentUser`] request extension.
///
/// Anonymous requests pass through unchanged. A session pointing at a user
/// that no longer exists is flushed.
pub async fn load_current_user(
    State(users): State<Arc<UserService>>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id: Option<Uuid> = session
        .get(SESSION_USER_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("Session load failed: {}", e)))?;

    if let Some(user_id) = user_id {
        match users.get_by_id(user_id).await? {
            Some(user) => {
                req.extensions_mut().insert(CurrentUser::from(user));
            }
            None => {
                tracing::debug!("Session references missing user {}, flushing", user_id);
                let _ = session.flush().await;
            }
        }
    }

    Ok(next.run(req).await)
}
