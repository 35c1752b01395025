//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use foodie_common::AppError;
use foodie_db::entities::user;

/// Authenticated user extractor.
///
/// Rejects with 401 when the session middleware attached no user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Not authorized".to_string()))
    }
}

/// Admin extractor: an authenticated user whose role is `admin`.
///
/// Runs after the same middleware as [`AuthUser`]; a signed-in non-admin
/// gets 403, an anonymous request 401.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authorized".to_string()))?;

        if !user.role.is_admin() {
            return Err(AppError::Forbidden("Not authorized as admin".to_string()));
        }

        Ok(Self(user))
    }
}
