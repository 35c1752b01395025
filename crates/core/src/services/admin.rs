//! Admin service: moderation, user management, and aggregate statistics.

use chrono::Datelike;
use foodie_common::{AppError, AppResult};
use foodie_db::{
    entities::{post, user},
    repositories::{CityCount, MonthCount, PostFilter, PostRepository, UserPostCount, UserRepository},
};
use sea_orm::Set;

/// How many rows the top-N aggregates return.
const TOP_N: u64 = 10;

/// Admin service for business logic.
#[derive(Clone)]
pub struct AdminService {
    post_repo: PostRepository,
    user_repo: UserRepository,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, user_repo: UserRepository) -> Self {
        Self {
            post_repo,
            user_repo,
        }
    }

    /// Filtered page over all posts with their owners, any approval state
    /// unless the filter narrows it.
    pub async fn list_posts(
        &self,
        filter: &PostFilter,
    ) -> AppResult<(Vec<(post::Model, Option<user::Model>)>, u64)> {
        let posts = self.post_repo.list(filter).await?;
        let total = self.post_repo.count(filter).await?;

        Ok((posts, total))
    }

    /// Flip a post's approval gate. This is the only path that can set it
    /// to true.
    pub async fn update_post_status(&self, id: &str, is_approved: bool) -> AppResult<post::Model> {
        let existing = self.post_repo.get_by_id(id).await?;

        let mut active: post::ActiveModel = existing.into();
        active.is_approved = Set(is_approved);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.post_repo.update(active).await
    }

    /// Post counts per month of the current calendar year.
    pub async fn monthly_stats(&self) -> AppResult<Vec<MonthCount>> {
        self.post_repo
            .monthly_stats(chrono::Utc::now().year())
            .await
    }

    /// Top cities by post count.
    pub async fn city_stats(&self) -> AppResult<Vec<CityCount>> {
        self.post_repo.city_stats(TOP_N).await
    }

    /// Top users by post count.
    pub async fn most_active_users(&self) -> AppResult<Vec<UserPostCount>> {
        self.user_repo.most_active(TOP_N).await
    }

    /// Every user with their post count.
    pub async fn all_users(&self) -> AppResult<Vec<UserPostCount>> {
        self.user_repo.list_with_post_counts().await
    }

    /// Change a user's role. The role string must parse into the closed
    /// enum; anything else is rejected at this boundary.
    pub async fn update_user_role(&self, id: &str, role: &str) -> AppResult<user::Model> {
        let role: user::Role = role
            .parse()
            .map_err(|()| AppError::BadRequest("Invalid role".to_string()))?;

        let existing = self.user_repo.get_by_id(id).await?;

        let mut active: user::ActiveModel = existing.into();
        active.role = Set(role);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Delete a user. The schema cascades the deletion to their posts and
    /// bookmarks.
    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        // Surface a 404 rather than deleting nothing silently.
        self.user_repo.get_by_id(id).await?;
        self.user_repo.delete(id).await
    }
}
