//! Token issuance endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::auth::auth_service::AuthService;
use crate::shared::error::PlatformError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: Arc<AuthService>,
}

/// Issue an access token after the client-side sign-in
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed access token", body = TokenResponse),
        (status = 400, description = "Missing email")
    )
)]
pub async fn issue_token(
    State(state): State<AuthApiState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, PlatformError> {
    let token = state.auth_service.issue_token(&req.email)?;
    Ok(Json(TokenResponse { token }))
}

pub fn auth_router(state: AuthApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(issue_token))
        .with_state(state)
}
