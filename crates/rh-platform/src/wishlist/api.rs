//! Wishlist API

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::listing::repository::ListingRepository;
use crate::shared::api_common::{EmailQuery, WriteResponse};
use crate::shared::authorization_service::{checks, FORBIDDEN_MESSAGE};
use crate::shared::error::PlatformError;
use crate::shared::ids::parse_object_id;
use crate::shared::middleware::Authenticated;
use crate::wishlist::entity::WishlistEntry;
use crate::wishlist::operations::{AddToWishlistCommand, AddToWishlistUseCase, RemoveFromWishlistUseCase};
use crate::wishlist::repository::WishlistRepository;

/// Wishlist entry DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntryResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub property_id: String,
    pub title: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub agent_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub minimum_price: f64,
    pub maximum_price: f64,
    pub buyer_email: String,
    pub created_at: String,
}

impl From<WishlistEntry> for WishlistEntryResponse {
    fn from(w: WishlistEntry) -> Self {
        Self {
            id: w.id.to_hex(),
            property_id: w.property_id,
            title: w.title,
            location: w.location,
            image: w.image,
            agent_email: w.agent_email,
            agent_name: w.agent_name,
            minimum_price: w.minimum_price,
            maximum_price: w.maximum_price,
            buyer_email: w.buyer_email,
            created_at: w.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    pub property_id: String,
}

#[derive(Clone)]
pub struct WishlistState {
    pub wishlist_repo: Arc<dyn WishlistRepository>,
    pub add_use_case: Arc<AddToWishlistUseCase>,
    pub remove_use_case: Arc<RemoveFromWishlistUseCase>,
}

impl WishlistState {
    pub fn new(listing_repo: Arc<dyn ListingRepository>, wishlist_repo: Arc<dyn WishlistRepository>) -> Self {
        Self {
            add_use_case: Arc::new(AddToWishlistUseCase::new(listing_repo, wishlist_repo.clone())),
            remove_use_case: Arc::new(RemoveFromWishlistUseCase::new(wishlist_repo.clone())),
            wishlist_repo,
        }
    }
}

/// Wishlist of a buyer
#[utoipa::path(
    get,
    path = "/wishlist",
    tag = "wishlist",
    params(EmailQuery),
    responses(
        (status = 200, description = "Entries, newest first", body = Vec<WishlistEntryResponse>),
        (status = 403, description = "Someone else's wishlist")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_wishlist(
    State(state): State<WishlistState>,
    auth: Authenticated,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<WishlistEntryResponse>>, PlatformError> {
    checks::require_authenticated(&auth.0)?;
    let email = query.email.unwrap_or_else(|| auth.email.clone());
    checks::require_self_or_admin(&auth.0, &email)?;

    let entries = state.wishlist_repo.find_by_buyer(&email).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Single wishlist entry
#[utoipa::path(
    get,
    path = "/wishlist/{id}",
    tag = "wishlist",
    params(("id" = String, Path, description = "Wishlist entry ID")),
    responses(
        (status = 200, description = "Entry found", body = WishlistEntryResponse),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_wishlist_entry(
    State(state): State<WishlistState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<WishlistEntryResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let oid = parse_object_id(&id)?;
    let entry = state.wishlist_repo.find_by_id(&oid).await?
        .ok_or_else(|| PlatformError::not_found("WishlistEntry", &id))?;

    if !auth.is_self(&entry.buyer_email) && !auth.is_admin() {
        return Err(PlatformError::forbidden(FORBIDDEN_MESSAGE));
    }

    Ok(Json(entry.into()))
}

/// Add a listing to the caller's wishlist
#[utoipa::path(
    post,
    path = "/wishlist-property",
    tag = "wishlist",
    request_body = AddToWishlistRequest,
    responses(
        (status = 200, description = "Entry added", body = WishlistEntryResponse),
        (status = 404, description = "Listing not found"),
        (status = 409, description = "Already on the wishlist")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_wishlist(
    State(state): State<WishlistState>,
    auth: Authenticated,
    Json(req): Json<AddToWishlistRequest>,
) -> Result<Json<WishlistEntryResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let command = AddToWishlistCommand { property_id: req.property_id };
    let entry = state.add_use_case.execute(command, &auth.email).await?;
    Ok(Json(entry.into()))
}

/// Remove an entry from the caller's wishlist
#[utoipa::path(
    delete,
    path = "/wishlist/{id}",
    tag = "wishlist",
    params(("id" = String, Path, description = "Wishlist entry ID")),
    responses(
        (status = 200, description = "Entry removed", body = WriteResponse),
        (status = 403, description = "Not the caller's entry"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_from_wishlist(
    State(state): State<WishlistState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<WriteResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let oid = parse_object_id(&id)?;
    state.remove_use_case.execute(&oid, &auth.email).await?;
    Ok(Json(WriteResponse::deleted(1)))
}

pub fn wishlist_router(state: WishlistState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_wishlist))
        .routes(routes!(get_wishlist_entry, remove_from_wishlist))
        .routes(routes!(add_to_wishlist))
        .with_state(state)
}
