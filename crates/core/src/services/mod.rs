//! Business logic services.

#![allow(missing_docs)]

pub mod admin;
pub mod auth;
pub mod bookmark;
pub mod post;
pub mod upload;

pub use admin::AdminService;
pub use auth::{AuthService, Claims, LoginInput, RegisterInput, Session};
pub use bookmark::{BookmarkService, BookmarkToggle, BookmarkedPost};
pub use post::{CreatePostInput, PostService, UpdatePostInput};
pub use upload::{HttpImageHost, ImageHost, ImageHostService, NoOpImageHost, UploadService};
