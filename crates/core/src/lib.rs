//! Core business logic for foodie-diary.

pub mod services;

pub use services::*;
