//! HTTP API layer for foodie-diary.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, posts, bookmarks, and the admin surface
//! - **Extractors**: authenticated user and admin gates
//! - **Middleware**: bearer-token session loading
//! - **Response**: shared DTOs and the pagination envelope
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
