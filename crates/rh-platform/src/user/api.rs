//! Users API

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::listing::repository::ListingRepository;
use crate::shared::api_common::{EmailQuery, MessageResponse, StepsResponse, WriteResponse};
use crate::shared::authorization_service::checks;
use crate::shared::error::PlatformError;
use crate::shared::ids::parse_object_id;
use crate::shared::middleware::Authenticated;
use crate::user::entity::{User, UserRole};
use crate::user::operations::{
    ChangeRoleCommand, ChangeRoleUseCase, RegisterOutcome, RegisterUserCommand, RegisterUserUseCase,
    UpdateProfileCommand, UpdateProfileUseCase, ROLE_UPDATED_MESSAGE, USER_EXISTS_MESSAGE,
};
use crate::user::repository::UserRepository;

/// User response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub role: UserRole,
    pub date: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_hex(),
            email: u.email,
            name: u.name,
            image: u.image,
            role: u.role,
            date: u.created_at.to_rfc3339(),
        }
    }
}

fn to_responses(users: Vec<User>) -> Vec<UserResponse> {
    users.into_iter().map(Into::into).collect()
}

/// Registration body; any role field is ignored
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Either the new user or a message that the email is taken
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RegisterUserResponse {
    Created(UserResponse),
    Existing(MessageResponse),
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    /// User ID
    pub id: String,
    /// Buyer, Agent, Admin or Fraud
    pub role: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleQuery {
    /// Defaults to Agent
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct UsersState {
    pub user_repo: Arc<dyn UserRepository>,
    pub register_use_case: Arc<RegisterUserUseCase>,
    pub change_role_use_case: Arc<ChangeRoleUseCase>,
    pub update_profile_use_case: Arc<UpdateProfileUseCase>,
}

impl UsersState {
    pub fn new(user_repo: Arc<dyn UserRepository>, listing_repo: Arc<dyn ListingRepository>) -> Self {
        Self {
            register_use_case: Arc::new(RegisterUserUseCase::new(user_repo.clone())),
            change_role_use_case: Arc::new(ChangeRoleUseCase::new(user_repo.clone(), listing_repo)),
            update_profile_use_case: Arc::new(UpdateProfileUseCase::new(user_repo.clone())),
            user_repo,
        }
    }
}

/// Register on first login
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "User created, or already present", body = RegisterUserResponse),
        (status = 400, description = "Invalid email")
    )
)]
pub async fn register_user(
    State(state): State<UsersState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<Json<RegisterUserResponse>, PlatformError> {
    let command = RegisterUserCommand {
        email: req.email,
        name: req.name,
        image: req.image,
    };

    let response = match state.register_use_case.execute(command).await? {
        RegisterOutcome::Created(user) => RegisterUserResponse::Created(user.into()),
        RegisterOutcome::AlreadyExists => {
            RegisterUserResponse::Existing(MessageResponse::new(USER_EXISTS_MESSAGE))
        }
    };
    Ok(Json(response))
}

/// Every user (Admin)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<UsersState>,
    auth: Authenticated,
) -> Result<Json<Vec<UserResponse>>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let users = state.user_repo.find_all().await?;
    Ok(Json(to_responses(users)))
}

/// Record of the logged-in user, used by the client to pick a dashboard
#[utoipa::path(
    get,
    path = "/logged-user-role",
    tag = "users",
    params(EmailQuery),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 403, description = "Someone else's record"),
        (status = 404, description = "Not registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_logged_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Query(query): Query<EmailQuery>,
) -> Result<Json<UserResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;
    let email = query.email.unwrap_or_else(|| auth.email.clone());
    checks::require_self_or_admin(&auth.0, &email)?;

    let user = state.user_repo.find_by_email(&email).await?
        .ok_or_else(|| PlatformError::not_found("User", &email))?;
    Ok(Json(user.into()))
}

/// Public directory of users with a role, newest first
#[utoipa::path(
    get,
    path = "/agents",
    tag = "users",
    params(RoleQuery),
    responses(
        (status = 200, description = "Users with the role", body = Vec<UserResponse>),
        (status = 400, description = "Unknown role")
    )
)]
pub async fn list_by_role(
    State(state): State<UsersState>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<UserResponse>>, PlatformError> {
    let role = match query.role.as_deref() {
        Some(r) if !r.trim().is_empty() => r.parse::<UserRole>()?,
        _ => UserRole::Agent,
    };

    let users = state.user_repo.find_by_role(role).await?;
    Ok(Json(to_responses(users)))
}

/// Public profile of one agent
#[utoipa::path(
    get,
    path = "/agent-data/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_agent(
    State(state): State<UsersState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, PlatformError> {
    let oid = parse_object_id(&id)?;
    let user = state.user_repo.find_by_id(&oid).await?
        .ok_or_else(|| PlatformError::not_found("User", &id))?;
    Ok(Json(user.into()))
}

/// Update name and image (self or Admin)
#[utoipa::path(
    put,
    path = "/update-user/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 403, description = "Someone else's profile"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let oid = parse_object_id(&id)?;
    let command = UpdateProfileCommand { name: req.name, image: req.image };
    let user = state.update_profile_use_case
        .execute(&oid, command, &auth.email, auth.is_admin())
        .await?;
    Ok(Json(user.into()))
}

/// Change a user's role (Admin). Moving an agent to Fraud deletes their listings.
#[utoipa::path(
    patch,
    path = "/users/role",
    tag = "users",
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = StepsResponse),
        (status = 207, description = "Role updated but listings were not all removed"),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_role(
    State(state): State<UsersState>,
    auth: Authenticated,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<StepsResponse>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let command = ChangeRoleCommand {
        user_id: parse_object_id(&req.id)?,
        role: req.role.parse()?,
    };
    let steps = state.change_role_use_case.execute(command).await?;
    Ok(Json(StepsResponse {
        message: ROLE_UPDATED_MESSAGE.to_string(),
        steps,
    }))
}

/// Delete a user record (Admin)
#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = WriteResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<WriteResponse>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let oid = parse_object_id(&id)?;
    if !state.user_repo.delete(&oid).await? {
        return Err(PlatformError::not_found("User", &id));
    }

    tracing::info!(user_id = %oid, "User deleted");
    Ok(Json(WriteResponse::deleted(1)))
}

pub fn users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register_user, list_users))
        .routes(routes!(get_logged_user))
        .routes(routes!(list_by_role))
        .routes(routes!(get_agent))
        .routes(routes!(update_profile))
        .routes(routes!(change_role))
        .routes(routes!(delete_user))
        .with_state(state)
}
