//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use foodie_common::{AppError, AppResult};
use foodie_core::{CreatePostInput, UpdatePostInput};
use foodie_db::repositories::PostFilter;
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ListQuery, MessageResponse, OwnerResponse, PostListResponse, PostResponse},
};

/// Mutation response carrying the affected post.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMutationResponse {
    pub message: String,
    pub post: PostResponse,
}

/// Fields of the multipart post form.
struct PostForm {
    title: String,
    location: String,
    review: String,
    rating: i32,
    eaten_at: DateTime<FixedOffset>,
    image: Option<Bytes>,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(e.to_string())
}

fn missing_field(field: &str) -> AppError {
    AppError::BadRequest(format!("Missing required field: {field}"))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
fn parse_eaten_at(text: &str) -> AppResult<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt);
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        .map_err(|_| AppError::BadRequest("Invalid eatenAt date".to_string()))
}

/// Pull the post fields out of a multipart form.
///
/// Field values arrive as strings; the rating is parsed to an integer
/// here so a form `rating="4"` is stored as the number 4.
async fn parse_post_form(mut multipart: Multipart) -> AppResult<PostForm> {
    let mut title = None;
    let mut location = None;
    let mut review = String::new();
    let mut rating = None;
    let mut eaten_at = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "title" => title = Some(field.text().await.map_err(multipart_error)?),
            "location" => location = Some(field.text().await.map_err(multipart_error)?),
            "review" => review = field.text().await.map_err(multipart_error)?,
            "rating" => {
                let text = field.text().await.map_err(multipart_error)?;
                rating = Some(
                    text.trim()
                        .parse::<i32>()
                        .map_err(|_| AppError::BadRequest("Invalid rating".to_string()))?,
                );
            }
            "eatenAt" => {
                let text = field.text().await.map_err(multipart_error)?;
                eaten_at = Some(parse_eaten_at(&text)?);
            }
            "image" => image = Some(field.bytes().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    Ok(PostForm {
        title: title.ok_or_else(|| missing_field("title"))?,
        location: location.ok_or_else(|| missing_field("location"))?,
        review,
        rating: rating.ok_or_else(|| missing_field("rating"))?,
        eaten_at: eaten_at.ok_or_else(|| missing_field("eatenAt"))?,
        image,
    })
}

/// List the caller's own posts, filtered and paginated.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PostListResponse>> {
    let filter = PostFilter {
        owner_id: Some(user.id),
        search: query.search(),
        min_rating: query.min_rating,
        approved: None,
        page: query.page(),
        limit: query.limit(),
    };

    let (posts, total) = state.post_service.list_own(&filter).await?;
    let posts = posts.into_iter().map(PostResponse::from).collect();

    Ok(Json(PostListResponse::new(posts, total, &query)))
}

/// Create a post from a multipart form with an optional `image` file.
///
/// The image is uploaded to the external host first; a failed upload
/// aborts before anything is written.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostMutationResponse>)> {
    let form = parse_post_form(multipart).await?;

    let image = match form.image {
        Some(data) if !data.is_empty() => state.upload_service.upload(data).await?,
        _ => String::new(),
    };

    let post = state
        .post_service
        .create(
            &user.id,
            CreatePostInput {
                title: form.title,
                location: form.location,
                review: form.review,
                rating: form.rating,
                eaten_at: form.eaten_at,
                image,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostMutationResponse {
            message: "Post created successfully".to_string(),
            post: post.into(),
        }),
    ))
}

/// Fetch one of the caller's posts (admins may fetch any).
async fn get_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostResponse>> {
    let (post, owner) = state.post_service.get_own(&id, &user).await?;

    Ok(Json(
        PostResponse::from(post).with_owner(owner.as_ref().map(OwnerResponse::from_user)),
    ))
}

/// Update one of the caller's posts. Always resets approval.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<PostMutationResponse>> {
    let form = parse_post_form(multipart).await?;

    let image = match form.image {
        Some(data) if !data.is_empty() => Some(state.upload_service.upload(data).await?),
        _ => None,
    };

    let post = state
        .post_service
        .update(
            &id,
            &user,
            UpdatePostInput {
                title: form.title,
                location: form.location,
                review: form.review,
                rating: form.rating,
                eaten_at: form.eaten_at,
                image,
            },
        )
        .await?;

    Ok(Json(PostMutationResponse {
        message: "Post updated successfully".to_string(),
        post: post.into(),
    }))
}

/// Delete one of the caller's posts (admins may delete any).
async fn delete_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.post_service.delete(&id, &user).await?;

    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// Fetch a publicly shared post. No authentication; approved posts only,
/// and the owner is reduced to id and name.
async fn get_shared(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostResponse>> {
    let (post, owner) = state.post_service.get_shared(&id).await?;

    Ok(Json(
        PostResponse::from(post).with_owner(owner.as_ref().map(OwnerResponse::public)),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_post).put(update).delete(delete_post))
        .route("/shared/{id}", get(get_shared))
}
