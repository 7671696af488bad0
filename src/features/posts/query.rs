//! Visibility rules and query composition for post listings.
//!
//! A post is publicly visible iff it is published, its publication moment
//! has passed, and it sits in a published category. The author bypasses all
//! of that for their own posts.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// SQL form of the public-visibility invariant. Expects the `posts` table
/// aliased as `p` with `categories` left-joined as `c`; a post without a
/// category fails the check.
pub const PUBLIC_FILTER: &str =
    "p.is_published AND p.pub_date <= NOW() AND COALESCE(c.is_published, FALSE)";

/// Which slice of posts a listing wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Everything publicly visible, site-wide.
    PublicFeed,
    /// Publicly visible posts of one category. The category itself must
    /// already be resolved (and verified published) by the caller.
    Category { category_id: Uuid },
    /// Posts of one author. `include_hidden` is set exactly when the viewer
    /// is that author and lifts the publish/date/category gating.
    Profile { user_id: Uuid, include_hidden: bool },
}

impl PostScope {
    /// WHERE clause for this scope. When [`bind_id`](Self::bind_id) yields a
    /// value it is referenced as `$1`.
    pub fn filter(&self) -> String {
        match self {
            PostScope::PublicFeed => PUBLIC_FILTER.to_string(),
            PostScope::Category { .. } => format!("p.category_id = $1 AND {}", PUBLIC_FILTER),
            PostScope::Profile {
                include_hidden: true,
                ..
            } => "p.author_id = $1".to_string(),
            PostScope::Profile {
                include_hidden: false,
                ..
            } => format!("p.author_id = $1 AND {}", PUBLIC_FILTER),
        }
    }

    /// The id bound as `$1`, when the scope is narrowed to one row's worth.
    pub fn bind_id(&self) -> Option<Uuid> {
        match self {
            PostScope::PublicFeed => None,
            PostScope::Category { category_id } => Some(*category_id),
            PostScope::Profile { user_id, .. } => Some(*user_id),
        }
    }
}

/// The public-visibility invariant as a plain predicate, for gating single
/// posts (detail page, commenting) without another query.
pub fn is_publicly_visible(
    is_published: bool,
    pub_date: DateTime<Utc>,
    category_is_published: Option<bool>,
    now: DateTime<Utc>,
) -> bool {
    is_published && pub_date <= now && category_is_published.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_visible_post() {
        let now = Utc::now();
        assert!(is_publicly_visible(
            true,
            now - Duration::hours(1),
            Some(true),
            now
        ));
    }

    #[test]
    fn test_unpublished_post_is_hidden() {
        let now = Utc::now();
        assert!(!is_publicly_visible(
            false,
            now - Duration::hours(1),
            Some(true),
            now
        ));
    }

    #[test]
    fn test_future_post_is_hidden() {
        let now = Utc::now();
        assert!(!is_publicly_visible(
            true,
            now + Duration::minutes(5),
            Some(true),
            now
        ));
    }

    #[test]
    fn test_pub_date_exactly_now_is_visible() {
        let now = Utc::now();
        assert!(is_publicly_visible(true, now, Some(true), now));
    }

    #[test]
    fn test_unpublished_category_hides_post() {
        let now = Utc::now();
        assert!(!is_publicly_visible(
            true,
            now - Duration::hours(1),
            Some(false),
            now
        ));
    }

    #[test]
    fn test_missing_category_hides_post() {
        let now = Utc::now();
        assert!(!is_publicly_visible(
            true,
            now - Duration::hours(1),
            None,
            now
        ));
    }

    #[test]
    fn test_feed_scope_has_no_bind() {
        let scope = PostScope::PublicFeed;
        assert_eq!(scope.filter(), PUBLIC_FILTER);
        assert_eq!(scope.bind_id(), None);
    }

    #[test]
    fn test_category_scope_filters_by_category_and_visibility() {
        let id = Uuid::new_v4();
        let scope = PostScope::Category { category_id: id };
        assert!(scope.filter().contains("p.category_id = $1"));
        assert!(scope.filter().contains(PUBLIC_FILTER));
        assert_eq!(scope.bind_id(), Some(id));
    }

    #[test]
    fn test_owner_profile_scope_bypasses_visibility() {
        let id = Uuid::new_v4();
        let scope = PostScope::Profile {
            user_id: id,
            include_hidden: true,
        };
        assert_eq!(scope.filter(), "p.author_id = $1");
        assert_eq!(scope.bind_id(), Some(id));
    }

    #[test]
    fn test_visitor_profile_scope_keeps_visibility() {
        let scope = PostScope::Profile {
            user_id: Uuid::new_v4(),
            include_hidden: false,
        };
        assert!(scope.filter().contains("p.author_id = $1"));
        assert!(scope.filter().contains(PUBLIC_FILTER));
    }
}
