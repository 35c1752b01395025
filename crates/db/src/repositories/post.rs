//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, User, post, user};
use foodie_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    sea_query::{Expr, extension::postgres::PgExpr},
};

/// Filter and pagination parameters shared by the post listings.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Restrict to a single owner (the own-posts listing); `None` for the
    /// admin all-posts view.
    pub owner_id: Option<String>,
    /// Case-insensitive substring match on title or location.
    pub search: Option<String>,
    /// Minimum rating, inclusive.
    pub min_rating: i32,
    /// Approval tri-state: `None` applies no filter.
    pub approved: Option<bool>,
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
}

impl PostFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all().add(post::Column::Rating.gte(self.min_rating));

        if let Some(owner_id) = &self.owner_id {
            condition = condition.add(post::Column::UserId.eq(owner_id));
        }

        if let Some(approved) = self.approved {
            condition = condition.add(post::Column::IsApproved.eq(approved));
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            condition = condition.add(
                Condition::any()
                    .add(Expr::col((post::Entity, post::Column::Title)).ilike(pattern.clone()))
                    .add(Expr::col((post::Entity, post::Column::Location)).ilike(pattern)),
            );
        }

        condition
    }

    fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit
    }
}

/// Post count for one month of the current year.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct MonthCount {
    pub month: i32,
    pub count: i64,
}

/// Post count for one city.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CityCount {
    pub city: String,
    pub count: i64,
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id).await?.ok_or(AppError::PostNotFound)
    }

    /// Find a post together with its owner.
    pub async fn find_with_owner(
        &self,
        id: &str,
    ) -> AppResult<Option<(post::Model, Option<user::Model>)>> {
        Post::find_by_id(id)
            .find_also_related(User)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Filtered page of posts with their owners, newest `eaten_at` first,
    /// id descending as the tie-break.
    pub async fn list(
        &self,
        filter: &PostFilter,
    ) -> AppResult<Vec<(post::Model, Option<user::Model>)>> {
        Post::find()
            .find_also_related(User)
            .filter(filter.condition())
            .order_by_desc(post::Column::EatenAt)
            .order_by_desc(post::Column::Id)
            .offset(filter.offset())
            .limit(filter.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count of posts matching the filter, ignoring pagination.
    pub async fn count(&self, filter: &PostFilter) -> AppResult<u64> {
        Post::find()
            .filter(filter.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Post counts grouped by month of `eaten_at` for the given year,
    /// month ascending.
    pub async fn monthly_stats(&self, year: i32) -> AppResult<Vec<MonthCount>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT CAST(EXTRACT(MONTH FROM "eaten_at") AS INTEGER) AS "month",
                      CAST(COUNT(*) AS BIGINT) AS "count"
               FROM "post"
               WHERE EXTRACT(YEAR FROM "eaten_at") = $1
               GROUP BY "month"
               ORDER BY "month""#,
            [year.into()],
        );

        MonthCount::find_by_statement(stmt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Post counts grouped by the trimmed segment after the last comma of
    /// `location`, top `limit` by count descending.
    pub async fn city_stats(&self, limit: u64) -> AppResult<Vec<CityCount>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT TRIM(SPLIT_PART("location", ',', -1)) AS "city",
                      CAST(COUNT(*) AS BIGINT) AS "count"
               FROM "post"
               GROUP BY "city"
               ORDER BY "count" DESC
               LIMIT $1"#,
            [(limit as i64).into()],
        );

        CityCount::find_by_statement(stmt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_post(id: &str, user_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "Pho at Hanoi Corner".to_string(),
            location: "12 Old Quarter, Hanoi".to_string(),
            review: "Rich broth.".to_string(),
            rating: 4,
            eaten_at: Utc::now().into(),
            image: String::new(),
            is_approved: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("nope").await;

        assert!(matches!(result, Err(AppError::PostNotFound)));
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let p = create_test_post("p1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_id("p1").await.unwrap();

        assert_eq!(result.unwrap().rating, 4);
    }

    #[tokio::test]
    async fn test_monthly_stats() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! {
                        "month" => Value::from(1i32),
                        "count" => Value::from(3i64),
                    },
                    btreemap! {
                        "month" => Value::from(4i32),
                        "count" => Value::from(1i64),
                    },
                ]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let stats = repo.monthly_stats(2025).await.unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0], MonthCount { month: 1, count: 3 });
    }

    #[tokio::test]
    async fn test_city_stats() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! {
                    "city" => Value::from("Hanoi"),
                    "count" => Value::from(5i64),
                }]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let stats = repo.city_stats(10).await.unwrap();

        assert_eq!(
            stats,
            vec![CityCount {
                city: "Hanoi".to_string(),
                count: 5
            }]
        );
    }

    #[test]
    fn test_filter_offset() {
        let filter = PostFilter {
            page: 3,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(filter.offset(), 20);

        // Page 0 is treated like page 1 rather than underflowing.
        let filter = PostFilter {
            page: 0,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(filter.offset(), 0);
    }
}
