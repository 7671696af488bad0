#[cfg(test)]
use crate::features::auth::model::CurrentUser;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
use chrono::Utc;

#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
pub fn create_test_user(username: &str) -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        first_name: None,
        last_name: None,
        created_at: Utc::now(),
    }
}

/// Wrap a router so every request carries the given user, bypassing the
/// session lookup.
#[cfg(test)]
pub fn with_logged_in_user(router: Router, user: CurrentUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}
