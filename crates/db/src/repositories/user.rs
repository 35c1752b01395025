//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use foodie_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    QueryFilter, Statement,
};

/// A user row with its computed post count, for admin listings.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct UserPostCount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: user::Role,
    pub post_count: i64,
}

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id).await?.ok_or(AppError::UserNotFound)
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email (exact, case-sensitive match).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user. Posts and bookmarks go with it via cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        User::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All users with their post counts, in no particular order.
    pub async fn list_with_post_counts(&self) -> AppResult<Vec<UserPostCount>> {
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            r#"SELECT u."id", u."name", u."email", u."role",
                      CAST(COUNT(p."id") AS BIGINT) AS "post_count"
               FROM "user" u
               LEFT JOIN "post" p ON p."user_id" = u."id"
               GROUP BY u."id", u."name", u."email", u."role""#,
        );

        UserPostCount::find_by_statement(stmt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Top users by post count, descending.
    pub async fn most_active(&self, limit: u64) -> AppResult<Vec<UserPostCount>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT u."id", u."name", u."email", u."role",
                      CAST(COUNT(p."id") AS BIGINT) AS "post_count"
               FROM "user" u
               LEFT JOIN "post" p ON p."user_id" = u."id"
               GROUP BY u."id", u."name", u."email", u."role"
               ORDER BY "post_count" DESC
               LIMIT $1"#,
            [(limit as i64).into()],
        );

        UserPostCount::find_by_statement(stmt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
