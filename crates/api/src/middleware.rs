//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use foodie_core::{AdminService, AuthService, BookmarkService, PostService, UploadService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub post_service: PostService,
    pub bookmark_service: BookmarkService,
    pub admin_service: AdminService,
    pub upload_service: UploadService,
}

/// Session middleware.
///
/// Resolves the bearer token to the current user record and attaches it to
/// the request. Missing or bad tokens just leave the request anonymous;
/// the [`crate::extractors::AuthUser`] extractor is what rejects.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        // Authenticate user by token
        match state.auth_service.authenticate(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Bearer token rejected"),
        }
    }

    next.run(req).await
}
