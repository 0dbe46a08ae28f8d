//! Authentication

pub mod auth_service;
pub mod api;

pub use auth_service::{AuthService, AccessTokenClaims, extract_bearer_token};
pub use api::{auth_router, AuthApiState};
