//! Bookmark endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use foodie_common::{AppError, AppResult};
use foodie_db::entities::bookmark;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ListQuery, OwnerResponse, PostListResponse, PostResponse},
};

/// Toggle request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub post_id: Option<String>,
}

/// Bookmark row response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResponse {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: String,
}

impl From<bookmark::Model> for BookmarkResponse {
    fn from(b: bookmark::Model) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            post_id: b.post_id,
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

/// Toggle response: the new state and the row created or removed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub message: String,
    pub is_bookmarked: bool,
    pub bookmark: BookmarkResponse,
}

/// Bookmark state response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkStateResponse {
    pub is_bookmarked: bool,
}

/// Flip the bookmark state for a post.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleRequest>,
) -> AppResult<Json<ToggleResponse>> {
    let post_id = req
        .post_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Post ID is required".to_string()))?;

    let outcome = state.bookmark_service.toggle(&user.id, &post_id).await?;

    let message = if outcome.is_bookmarked {
        "Bookmark added successfully"
    } else {
        "Bookmark removed successfully"
    };

    Ok(Json(ToggleResponse {
        message: message.to_string(),
        is_bookmarked: outcome.is_bookmarked,
        bookmark: outcome.bookmark.into(),
    }))
}

/// List the caller's bookmarked posts, newest bookmark first.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PostListResponse>> {
    let (entries, total) = state
        .bookmark_service
        .list(&user.id, query.page(), query.limit())
        .await?;

    let posts = entries
        .into_iter()
        .map(|entry| {
            let mut post = PostResponse::from(entry.post)
                .with_owner(entry.owner.as_ref().map(OwnerResponse::from_user));
            post.bookmarked_at = Some(entry.bookmark.created_at.to_rfc3339());
            post
        })
        .collect();

    Ok(Json(PostListResponse::new(posts, total, &query)))
}

/// Check whether the caller has bookmarked a post.
async fn check(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<BookmarkStateResponse>> {
    let is_bookmarked = state
        .bookmark_service
        .is_bookmarked(&user.id, &post_id)
        .await?;

    Ok(Json(BookmarkStateResponse { is_bookmarked }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/toggle", post(toggle))
        .route("/{post_id}", get(check))
}
