//! API endpoints.

mod admin;
mod auth;
mod bookmarks;
mod posts;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/posts", posts::router())
        .nest("/bookmarks", bookmarks::router())
        .nest("/admin", admin::router())
}
