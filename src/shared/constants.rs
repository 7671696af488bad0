/// Fixed page size for all post listings
pub const POSTS_PER_PAGE: i64 = 10;

/// Session key holding the logged-in user's id
pub const SESSION_USER_KEY: &str = "user_id";

/// MIME types accepted for post images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
