//! Shared response DTOs and the pagination envelope.

use foodie_db::entities::{post, user};
use serde::{Deserialize, Serialize};

/// Listing query parameters shared by the post listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub min_rating: i32,
    /// Admin listing only: `None` applies no approval filter.
    #[serde(default)]
    pub approved: Option<bool>,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    10
}

impl ListQuery {
    /// Page number as used for the offset: at least 1.
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// Page size, clamped to a sane window.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, 100)
    }

    /// Search term, `None` when blank.
    #[must_use]
    pub fn search(&self) -> Option<String> {
        if self.search.is_empty() {
            None
        } else {
            Some(self.search.clone())
        }
    }
}

/// Number of pages needed for `total` rows at `limit` per page.
#[must_use]
pub fn total_pages(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1))
}

/// The paginated post listing envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl PostListResponse {
    /// Assemble the envelope, echoing the requested page verbatim.
    #[must_use]
    pub fn new(posts: Vec<PostResponse>, total: u64, query: &ListQuery) -> Self {
        Self {
            posts,
            total_pages: total_pages(total, query.limit()),
            current_page: query.page,
            total,
        }
    }
}

/// Public owner fields joined onto a post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl OwnerResponse {
    /// Owner fields for authenticated consumers.
    #[must_use]
    pub fn from_user(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: Some(user.email.clone()),
        }
    }

    /// Owner fields for the public shared-post endpoint: no email.
    #[must_use]
    pub fn public(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: None,
        }
    }
}

/// Post response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub location: String,
    pub review: String,
    pub rating: i32,
    pub eaten_at: String,
    pub image: String,
    pub is_approved: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OwnerResponse>,
    /// Set on the bookmarks listing: when the post was bookmarked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmarked_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            location: p.location,
            review: p.review,
            rating: p.rating,
            eaten_at: p.eaten_at.to_rfc3339(),
            image: p.image,
            is_approved: p.is_approved,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
            user: None,
            bookmarked_at: None,
        }
    }
}

impl PostResponse {
    /// Attach owner fields.
    #[must_use]
    pub fn with_owner(mut self, owner: Option<OwnerResponse>) -> Self {
        self.user = owner;
        self
    }
}

/// Bare confirmation body for mutations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Create a confirmation body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public user fields, as returned by auth and admin endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: user::Role,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn test_list_query_sanitizes() {
        let query = ListQuery {
            page: 0,
            limit: 1000,
            search: String::new(),
            min_rating: 0,
            approved: None,
        };

        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 100);
        assert!(query.search().is_none());
    }

    #[test]
    fn test_public_owner_has_no_email() {
        let u = user::Model {
            id: "u1".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$test".to_string(),
            name: "Alice".to_string(),
            role: user::Role::User,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        };

        let json = serde_json::to_value(OwnerResponse::public(&u)).unwrap();
        assert!(json.get("email").is_none());

        let json = serde_json::to_value(OwnerResponse::from_user(&u)).unwrap();
        assert_eq!(json["email"], "alice@example.com");
    }
}
