//! Admin endpoints: moderation, user management, and statistics.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch},
};
use foodie_common::AppResult;
use foodie_db::repositories::{CityCount, MonthCount, PostFilter, UserPostCount};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{ListQuery, MessageResponse, OwnerResponse, PostListResponse, PostResponse, UserResponse},
};

use super::posts::PostMutationResponse;

/// Post status update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub is_approved: bool,
}

/// Role update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Monthly post count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatResponse {
    pub month: i32,
    pub count: i64,
}

impl From<MonthCount> for MonthlyStatResponse {
    fn from(m: MonthCount) -> Self {
        Self {
            month: m.month,
            count: m.count,
        }
    }
}

/// City post count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStatResponse {
    pub city: String,
    pub count: i64,
}

impl From<CityCount> for CityStatResponse {
    fn from(c: CityCount) -> Self {
        Self {
            city: c.city,
            count: c.count,
        }
    }
}

/// Most-active listing entry: public fields plus the post count.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub post_count: i64,
}

/// Admin user listing entry, including the role.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: foodie_db::entities::user::Role,
    pub post_count: i64,
}

impl From<UserPostCount> for ActiveUserResponse {
    fn from(u: UserPostCount) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            post_count: u.post_count,
        }
    }
}

impl From<UserPostCount> for AdminUserResponse {
    fn from(u: UserPostCount) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            post_count: u.post_count,
        }
    }
}

/// List all posts with owners, including the approval tri-state filter.
async fn list_posts(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PostListResponse>> {
    let filter = PostFilter {
        owner_id: None,
        search: query.search(),
        min_rating: query.min_rating,
        approved: query.approved,
        page: query.page(),
        limit: query.limit(),
    };

    let (rows, total) = state.admin_service.list_posts(&filter).await?;

    let posts = rows
        .into_iter()
        .map(|(post, owner)| {
            PostResponse::from(post).with_owner(owner.as_ref().map(OwnerResponse::from_user))
        })
        .collect();

    Ok(Json(PostListResponse::new(posts, total, &query)))
}

/// Approve or hide a post.
async fn update_post_status(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<PostMutationResponse>> {
    let post = state
        .admin_service
        .update_post_status(&id, req.is_approved)
        .await?;

    let message = if req.is_approved {
        "Post approved successfully"
    } else {
        "Post hidden successfully"
    };

    Ok(Json(PostMutationResponse {
        message: message.to_string(),
        post: post.into(),
    }))
}

/// Post counts per month of the current year.
async fn monthly_stats(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MonthlyStatResponse>>> {
    let stats = state.admin_service.monthly_stats().await?;

    Ok(Json(stats.into_iter().map(Into::into).collect()))
}

/// Top cities by post count.
async fn city_stats(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CityStatResponse>>> {
    let stats = state.admin_service.city_stats().await?;

    Ok(Json(stats.into_iter().map(Into::into).collect()))
}

/// Top users by post count.
async fn most_active_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ActiveUserResponse>>> {
    let users = state.admin_service.most_active_users().await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// All users with their post counts.
async fn all_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AdminUserResponse>>> {
    let users = state.admin_service.all_users().await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Change a user's role.
async fn update_user_role(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> AppResult<Json<RoleMutationResponse>> {
    let user = state.admin_service.update_user_role(&id, &req.role).await?;

    Ok(Json(RoleMutationResponse {
        message: "User role updated successfully".to_string(),
        user: user.into(),
    }))
}

/// Role mutation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMutationResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Delete a user along with their posts and bookmarks.
async fn delete_user(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.admin_service.delete_user(&id).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}/status", patch(update_post_status))
        .route("/stats/monthly", get(monthly_stats))
        .route("/stats/cities", get(city_stats))
        .route("/stats/users/active", get(most_active_users))
        .route("/users", get(all_users))
        .route("/users/{id}/role", patch(update_user_role))
        .route("/users/{id}", delete(delete_user))
}
