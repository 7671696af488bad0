use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::features::users::models::User;

/// The viewer identity attached to a request once the session resolves.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CurrentUser {
    pub fn is_author_of(&self, author_id: Uuid) -> bool {
        self.id == author_id
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}
