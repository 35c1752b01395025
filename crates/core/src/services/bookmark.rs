//! Bookmark service.

use std::collections::HashMap;

use foodie_common::{AppError, AppResult, IdGenerator};
use foodie_db::{
    entities::{bookmark, post, user},
    repositories::{BookmarkRepository, PostRepository, UserRepository},
};
use sea_orm::Set;

/// Outcome of a bookmark toggle: the new state plus the row that was
/// created or removed.
#[derive(Debug, Clone)]
pub struct BookmarkToggle {
    pub is_bookmarked: bool,
    pub bookmark: bookmark::Model,
}

/// One entry of the bookmarked-posts listing.
#[derive(Debug, Clone)]
pub struct BookmarkedPost {
    pub bookmark: bookmark::Model,
    pub post: post::Model,
    pub owner: Option<user::Model>,
}

/// Bookmark service for business logic.
#[derive(Clone)]
pub struct BookmarkService {
    bookmark_repo: BookmarkRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl BookmarkService {
    /// Create a new bookmark service.
    #[must_use]
    pub const fn new(
        bookmark_repo: BookmarkRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            bookmark_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Flip the bookmark state for `(user, post)`.
    ///
    /// The concurrent cases both collapse to no-ops: losing a delete race
    /// still reports "removed", and losing an insert race reports
    /// "bookmarked" with the surviving row.
    pub async fn toggle(&self, user_id: &str, post_id: &str) -> AppResult<BookmarkToggle> {
        if post_id.is_empty() {
            return Err(AppError::BadRequest("Post ID is required".to_string()));
        }

        self.post_repo.get_by_id(post_id).await?;

        if let Some(existing) = self
            .bookmark_repo
            .find_by_user_and_post(user_id, post_id)
            .await?
        {
            // Zero rows affected means a concurrent toggle got there first.
            self.bookmark_repo.delete(&existing.id).await?;

            return Ok(BookmarkToggle {
                is_bookmarked: false,
                bookmark: existing,
            });
        }

        let model = bookmark::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.bookmark_repo.create(model).await {
            Ok(created) => Ok(BookmarkToggle {
                is_bookmarked: true,
                bookmark: created,
            }),
            // Unique-index violation: a concurrent toggle already inserted
            // the row. Surface that row instead of an error.
            Err(AppError::Conflict(_)) => {
                let existing = self
                    .bookmark_repo
                    .find_by_user_and_post(user_id, post_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal("Bookmark lost in concurrent toggle".to_string())
                    })?;

                Ok(BookmarkToggle {
                    is_bookmarked: true,
                    bookmark: existing,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Check whether the user has bookmarked the post.
    pub async fn is_bookmarked(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        self.bookmark_repo.is_bookmarked(user_id, post_id).await
    }

    /// Page of the user's bookmarked posts with their owners, newest
    /// bookmark first.
    pub async fn list(
        &self,
        user_id: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<BookmarkedPost>, u64)> {
        let rows = self
            .bookmark_repo
            .find_posts_by_user(user_id, page, limit)
            .await?;
        let total = self.bookmark_repo.count_by_user(user_id).await?;

        let mut owner_ids: Vec<String> = rows
            .iter()
            .filter_map(|(_, p)| p.as_ref().map(|p| p.user_id.clone()))
            .collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let entries = rows
            .into_iter()
            .filter_map(|(b, p)| {
                p.map(|p| BookmarkedPost {
                    owner: owners.get(&p.user_id).cloned(),
                    bookmark: b,
                    post: p,
                })
            })
            .collect();

        Ok((entries, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_post(id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: "owner".to_string(),
            title: "Banh mi stop".to_string(),
            location: "District 1, Saigon".to_string(),
            review: "Crusty.".to_string(),
            rating: 4,
            eaten_at: Utc::now().into(),
            image: String::new(),
            is_approved: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_bookmark(id: &str, user_id: &str, post_id: &str) -> bookmark::Model {
        bookmark::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(
        bookmark_db: Arc<sea_orm::DatabaseConnection>,
        post_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> BookmarkService {
        BookmarkService::new(
            BookmarkRepository::new(bookmark_db),
            PostRepository::new(post_db),
            UserRepository::new(user_db),
        )
    }

    #[tokio::test]
    async fn test_toggle_missing_post_id() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(db.clone(), db.clone(), db);

        let result = service.toggle("u1", "").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_toggle_unknown_post() {
        let bookmark_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(bookmark_db, post_db, user_db);

        let result = service.toggle("u1", "missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound)));
    }

    #[tokio::test]
    async fn test_toggle_removes_existing() {
        let existing = create_test_bookmark("b1", "u1", "p1");

        let bookmark_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1")]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(bookmark_db, post_db, user_db);

        let outcome = service.toggle("u1", "p1").await.unwrap();

        assert!(!outcome.is_bookmarked);
        assert_eq!(outcome.bookmark.id, "b1");
    }

    #[tokio::test]
    async fn test_toggle_removes_even_when_row_already_gone() {
        let existing = create_test_bookmark("b1", "u1", "p1");

        let bookmark_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1")]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(bookmark_db, post_db, user_db);

        let outcome = service.toggle("u1", "p1").await.unwrap();

        assert!(!outcome.is_bookmarked);
    }

    #[tokio::test]
    async fn test_toggle_creates_when_absent() {
        let created = create_test_bookmark("b2", "u1", "p1");

        let bookmark_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<bookmark::Model>::new()])
                .append_query_results([[created]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1")]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(bookmark_db, post_db, user_db);

        let outcome = service.toggle("u1", "p1").await.unwrap();

        assert!(outcome.is_bookmarked);
        assert_eq!(outcome.bookmark.id, "b2");
    }

    #[tokio::test]
    async fn test_list_joins_posts_and_owners() {
        let b = create_test_bookmark("b1", "u1", "p1");
        let p = create_test_post("p1");
        let owner = user::Model {
            id: "owner".to_string(),
            email: "owner@example.com".to_string(),
            password_hash: "$argon2id$test".to_string(),
            name: "Owner".to_string(),
            role: user::Role::User,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let bookmark_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(b, p)]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::from(1i64),
                }]])
                .into_connection(),
        );
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[owner]])
                .into_connection(),
        );
        let service = service(bookmark_db, post_db, user_db);

        let (entries, total) = service.list("u1", 1, 10).await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].post.id, "p1");
        assert_eq!(entries[0].owner.as_ref().unwrap().name, "Owner");
    }
}
