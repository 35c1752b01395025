//! Post service.

use foodie_common::{AppError, AppResult, IdGenerator};
use foodie_db::{
    entities::{post, user},
    repositories::{PostFilter, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 512))]
    pub location: String,

    pub review: String,

    #[validate(range(min = 1, max = 5))]
    pub rating: i32,

    pub eaten_at: chrono::DateTime<chrono::FixedOffset>,

    /// Hosted image URL; empty when no photo was uploaded.
    pub image: String,
}

/// Input for updating a post. The image is kept when `None`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 512))]
    pub location: String,

    pub review: String,

    #[validate(range(min = 1, max = 5))]
    pub rating: i32,

    pub eaten_at: chrono::DateTime<chrono::FixedOffset>,

    pub image: Option<String>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(post_repo: PostRepository) -> Self {
        Self {
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post owned by `owner_id`. New posts always await approval.
    pub async fn create(&self, owner_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(owner_id.to_string()),
            title: Set(input.title),
            location: Set(input.location),
            review: Set(input.review),
            rating: Set(input.rating),
            eaten_at: Set(input.eaten_at),
            image: Set(input.image),
            is_approved: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.post_repo.create(model).await
    }

    /// Filtered page of the user's own posts.
    pub async fn list_own(&self, filter: &PostFilter) -> AppResult<(Vec<post::Model>, u64)> {
        let posts = self
            .post_repo
            .list(filter)
            .await?
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        let total = self.post_repo.count(filter).await?;

        Ok((posts, total))
    }

    /// Fetch a post with its owner, gated to the owner or an admin.
    pub async fn get_own(
        &self,
        id: &str,
        current: &user::Model,
    ) -> AppResult<(post::Model, Option<user::Model>)> {
        let (found, owner) = self
            .post_repo
            .find_with_owner(id)
            .await?
            .ok_or(AppError::PostNotFound)?;

        if found.user_id != current.id && !current.role.is_admin() {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        Ok((found, owner))
    }

    /// Update a post. Owner only; always drops the post back out of the
    /// approved state so it goes through review again.
    pub async fn update(
        &self,
        id: &str,
        current: &user::Model,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let existing = self.post_repo.get_by_id(id).await?;

        if existing.user_id != current.id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        self.post_repo.update(apply_update(existing, input)).await
    }

    /// Delete a post. Owner or admin.
    pub async fn delete(&self, id: &str, current: &user::Model) -> AppResult<()> {
        let existing = self.post_repo.get_by_id(id).await?;

        if existing.user_id != current.id && !current.role.is_admin() {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        self.post_repo.delete(id).await
    }

    /// Fetch a publicly shared post with its owner. No authentication;
    /// only approved posts are served.
    pub async fn get_shared(&self, id: &str) -> AppResult<(post::Model, Option<user::Model>)> {
        let (found, owner) = self
            .post_repo
            .find_with_owner(id)
            .await?
            .ok_or(AppError::PostNotFound)?;

        if !found.is_approved {
            return Err(AppError::Forbidden(
                "This post is not available".to_string(),
            ));
        }

        Ok((found, owner))
    }
}

/// Build the update, carrying over the image when no new one was uploaded
/// and resetting approval unconditionally.
fn apply_update(existing: post::Model, input: UpdatePostInput) -> post::ActiveModel {
    let image = input.image.unwrap_or_else(|| existing.image.clone());
    let mut active: post::ActiveModel = existing.into();

    active.title = Set(input.title);
    active.location = Set(input.location);
    active.review = Set(input.review);
    active.rating = Set(input.rating);
    active.eaten_at = Set(input.eaten_at);
    active.image = Set(image);
    active.is_approved = Set(false);
    active.updated_at = Set(Some(chrono::Utc::now().into()));

    active
}
