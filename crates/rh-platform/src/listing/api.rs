//! Listings API
//!
//! Agent-owned property listings, admin moderation and buyer search.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::listing::entity::{Listing, ListingChanges, VerificationStatus};
use crate::listing::operations::{
    CreateListingCommand, CreateListingUseCase,
    UpdateListingCommand, UpdateListingUseCase,
    SetVerificationStatusCommand, SetVerificationStatusUseCase,
    SetAdvertiseCommand, SetAdvertiseUseCase,
    DeleteListingCommand, DeleteListingUseCase,
    SearchListingsUseCase,
};
use crate::listing::repository::ListingRepository;
use crate::listing::search::ListingSearch;
use crate::shared::api_common::{string_or_number, EmailQuery, MessageResponse, StepsResponse};
use crate::shared::authorization_service::checks;
use crate::shared::error::PlatformError;
use crate::shared::ids::parse_object_id;
use crate::shared::middleware::Authenticated;

/// Listing response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub agent_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_image: Option<String>,
    pub minimum_price: f64,
    pub maximum_price: f64,
    pub status: VerificationStatus,
    pub advertise: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Listing> for ListingResponse {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id.to_hex(),
            title: l.title,
            location: l.location,
            image: l.image,
            description: l.description,
            agent_email: l.agent_email,
            agent_name: l.agent_name,
            agent_image: l.agent_image,
            minimum_price: l.minimum_price,
            maximum_price: l.maximum_price,
            status: l.status,
            advertise: l.advertise,
            created_at: l.created_at.to_rfc3339(),
            updated_at: l.updated_at.to_rfc3339(),
        }
    }
}

fn to_responses(listings: Vec<Listing>) -> Vec<ListingResponse> {
    listings.into_iter().map(Into::into).collect()
}

/// Create listing request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    pub location: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub agent_name: Option<String>,
    pub agent_image: Option<String>,
    pub minimum_price: f64,
    pub maximum_price: f64,
}

/// Update listing request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub minimum_price: Option<f64>,
    pub maximum_price: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvertiseRequest {
    pub id: String,
    pub advertise: bool,
}

/// Search query for verified listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub status: Option<String>,
    /// Case-insensitive location text
    pub search: Option<String>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_f64_opt")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_f64_opt")]
    pub max_price: Option<f64>,
    /// 1-indexed
    #[serde(default, deserialize_with = "string_or_number::deserialize_u32_opt")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_u32_opt")]
    pub size: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub result: Vec<ListingResponse>,
    pub count: u64,
}

/// Listings service state
#[derive(Clone)]
pub struct ListingsState {
    pub listing_repo: Arc<dyn ListingRepository>,
    pub create_use_case: Arc<CreateListingUseCase>,
    pub update_use_case: Arc<UpdateListingUseCase>,
    pub status_use_case: Arc<SetVerificationStatusUseCase>,
    pub advertise_use_case: Arc<SetAdvertiseUseCase>,
    pub delete_use_case: Arc<DeleteListingUseCase>,
    pub search_use_case: Arc<SearchListingsUseCase>,
}

impl ListingsState {
    pub fn new(listing_repo: Arc<dyn ListingRepository>) -> Self {
        Self {
            create_use_case: Arc::new(CreateListingUseCase::new(listing_repo.clone())),
            update_use_case: Arc::new(UpdateListingUseCase::new(listing_repo.clone())),
            status_use_case: Arc::new(SetVerificationStatusUseCase::new(listing_repo.clone())),
            advertise_use_case: Arc::new(SetAdvertiseUseCase::new(listing_repo.clone())),
            delete_use_case: Arc::new(DeleteListingUseCase::new(listing_repo.clone())),
            search_use_case: Arc::new(SearchListingsUseCase::new(listing_repo.clone())),
            listing_repo,
        }
    }
}

/// All listings, any status
#[utoipa::path(
    get,
    path = "/properties",
    tag = "listings",
    responses(
        (status = 200, description = "All listings", body = Vec<ListingResponse>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_all(
    State(state): State<ListingsState>,
    auth: Authenticated,
) -> Result<Json<Vec<ListingResponse>>, PlatformError> {
    checks::require_admin(&auth.0)?;
    Ok(Json(to_responses(state.listing_repo.find_all().await?)))
}

/// Listings owned by the calling agent
#[utoipa::path(
    get,
    path = "/agent-properties",
    tag = "listings",
    params(EmailQuery),
    responses(
        (status = 200, description = "Agent's listings", body = Vec<ListingResponse>),
        (status = 403, description = "Agent only, own listings")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_agent_listings(
    State(state): State<ListingsState>,
    auth: Authenticated,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<ListingResponse>>, PlatformError> {
    checks::require_agent(&auth.0)?;
    let email = query.email.unwrap_or_else(|| auth.email.clone());
    checks::require_self_or_admin(&auth.0, &email)?;
    Ok(Json(to_responses(state.listing_repo.find_by_agent(&email).await?)))
}

/// Advertised listings for the public landing page
#[utoipa::path(
    get,
    path = "/advertised-properties",
    tag = "listings",
    responses(
        (status = 200, description = "Advertised, verified listings", body = Vec<ListingResponse>)
    )
)]
pub async fn list_advertised(
    State(state): State<ListingsState>,
) -> Result<Json<Vec<ListingResponse>>, PlatformError> {
    Ok(Json(to_responses(state.listing_repo.find_advertised().await?)))
}

/// Paginated, filtered listing search
#[utoipa::path(
    get,
    path = "/verified-properties",
    tag = "listings",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching page and total count", body = SearchResponse),
        (status = 400, description = "Unknown status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_listings(
    State(state): State<ListingsState>,
    auth: Authenticated,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let search = ListingSearch::new(
        query.status.as_deref(),
        query.search.as_deref(),
        query.min_price,
        query.max_price,
        query.page,
        query.size,
    )?;
    let page = state.search_use_case.execute(&search).await?;

    Ok(Json(SearchResponse {
        result: to_responses(page.listings),
        count: page.count,
    }))
}

/// Single listing
#[utoipa::path(
    get,
    path = "/property/{id}",
    tag = "listings",
    params(("id" = String, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing found", body = ListingResponse),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_listing(
    State(state): State<ListingsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ListingResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;
    let oid = parse_object_id(&id)?;
    let listing = state.listing_repo.find_by_id(&oid).await?
        .ok_or_else(|| PlatformError::not_found("Listing", &id))?;
    Ok(Json(listing.into()))
}

/// Publish a new listing (starts Pending)
#[utoipa::path(
    post,
    path = "/add-property",
    tag = "listings",
    request_body = CreateListingRequest,
    responses(
        (status = 200, description = "Listing created", body = ListingResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Agent only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_listing(
    State(state): State<ListingsState>,
    auth: Authenticated,
    Json(req): Json<CreateListingRequest>,
) -> Result<Json<ListingResponse>, PlatformError> {
    checks::require_agent(&auth.0)?;

    let command = CreateListingCommand {
        title: req.title,
        location: req.location,
        image: req.image,
        description: req.description,
        agent_name: req.agent_name,
        agent_image: req.agent_image,
        minimum_price: req.minimum_price,
        maximum_price: req.maximum_price,
    };
    let listing = state.create_use_case.execute(command, &auth.email).await?;
    Ok(Json(listing.into()))
}

/// Edit descriptive fields of an owned listing
#[utoipa::path(
    put,
    path = "/property/{id}",
    tag = "listings",
    params(("id" = String, Path, description = "Listing ID")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Listing updated", body = ListingResponse),
        (status = 403, description = "Not the owning agent"),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_listing(
    State(state): State<ListingsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<ListingResponse>, PlatformError> {
    checks::require_agent(&auth.0)?;

    let command = UpdateListingCommand {
        id: parse_object_id(&id)?,
        changes: ListingChanges {
            title: req.title,
            location: req.location,
            image: req.image,
            description: req.description,
            minimum_price: req.minimum_price,
            maximum_price: req.maximum_price,
        },
    };
    let listing = state.update_use_case.execute(command, &auth.email).await?;
    Ok(Json(listing.into()))
}

/// Set verification status
#[utoipa::path(
    patch,
    path = "/property/status/{id}",
    tag = "listings",
    params(("id" = String, Path, description = "Listing ID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = StepsResponse),
        (status = 207, description = "Status updated but the advertisement was not withdrawn"),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_listing_status(
    State(state): State<ListingsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<StepsResponse>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let command = SetVerificationStatusCommand {
        id: parse_object_id(&id)?,
        status: req.status.parse()?,
    };
    let steps = state.status_use_case.execute(command).await?;
    Ok(Json(StepsResponse {
        message: "Property status updated".to_string(),
        steps,
    }))
}

/// Toggle the advertise flag
#[utoipa::path(
    patch,
    path = "/advertise-property",
    tag = "listings",
    request_body = AdvertiseRequest,
    responses(
        (status = 200, description = "Advertise flag updated", body = MessageResponse),
        (status = 400, description = "Listing not verified"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_advertise(
    State(state): State<ListingsState>,
    auth: Authenticated,
    Json(req): Json<AdvertiseRequest>,
) -> Result<Json<MessageResponse>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let command = SetAdvertiseCommand {
        id: parse_object_id(&req.id)?,
        advertise: req.advertise,
    };
    state.advertise_use_case.execute(command).await?;
    Ok(Json(MessageResponse::new("Property advertise status updated")))
}

/// Delete an owned listing
#[utoipa::path(
    delete,
    path = "/property/{id}",
    tag = "listings",
    params(("id" = String, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing deleted", body = MessageResponse),
        (status = 403, description = "Not the owning agent"),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_listing(
    State(state): State<ListingsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, PlatformError> {
    checks::require_agent(&auth.0)?;

    let command = DeleteListingCommand { id: parse_object_id(&id)? };
    state.delete_use_case.execute(command, &auth.email).await?;
    Ok(Json(MessageResponse::new("Property deleted")))
}

/// Create listings router
pub fn listings_router(state: ListingsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_all))
        .routes(routes!(list_agent_listings))
        .routes(routes!(list_advertised))
        .routes(routes!(search_listings))
        .routes(routes!(get_listing, update_listing, delete_listing))
        .routes(routes!(create_listing))
        .routes(routes!(set_listing_status))
        .routes(routes!(set_advertise))
        .with_state(state)
}
