//! Authentication endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use foodie_common::AppResult;
use foodie_core::{LoginInput, RegisterInput, Session};
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::UserResponse};

/// Register request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session response: bearer token plus the public user fields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.user.into(),
        }
    }
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let session = state
        .auth_service
        .register(RegisterInput {
            email: req.email,
            password: req.password,
            name: req.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Log in to an existing account.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state
        .auth_service
        .login(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(session.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
