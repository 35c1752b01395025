//! Bookmark repository.

use std::sync::Arc;

use crate::entities::{Bookmark, Post, bookmark, post};
use foodie_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};

/// Bookmark repository for database operations.
#[derive(Clone)]
pub struct BookmarkRepository {
    db: Arc<DatabaseConnection>,
}

impl BookmarkRepository {
    /// Create a new bookmark repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a bookmark by user and post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<bookmark::Model>> {
        Bookmark::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a post is bookmarked by user.
    pub async fn is_bookmarked(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        Ok(self.find_by_user_and_post(user_id, post_id).await?.is_some())
    }

    /// Create a new bookmark.
    ///
    /// A violation of the `(user_id, post_id)` unique index surfaces as
    /// [`AppError::Conflict`] so that the toggle can treat a lost insert
    /// race as "already bookmarked".
    pub async fn create(&self, model: bookmark::ActiveModel) -> AppResult<bookmark::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Post already bookmarked".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a bookmark by ID, returning how many rows went away.
    ///
    /// Zero means the row was already gone: a lost delete race, which
    /// callers treat as a no-op.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = Bookmark::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Page of a user's bookmarks with their posts, newest bookmark first,
    /// id descending as the tie-break.
    pub async fn find_posts_by_user(
        &self,
        user_id: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<Vec<(bookmark::Model, Option<post::Model>)>> {
        Bookmark::find()
            .find_also_related(Post)
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .order_by_desc(bookmark::Column::Id)
            .offset(page.saturating_sub(1) * limit)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count bookmarks for a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Bookmark::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
