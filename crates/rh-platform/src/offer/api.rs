//! Offers API

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::listing::repository::ListingRepository;
use crate::offer::entity::{Offer, OfferStatus};
use crate::offer::operations::{
    AcceptOfferCommand, AcceptOfferOutcome, AcceptOfferUseCase,
    SetOfferStatusCommand, SetOfferStatusUseCase,
    SubmitOfferCommand, SubmitOfferUseCase,
};
use crate::offer::repository::OfferRepository;
use crate::shared::api_common::{EmailQuery, MessageResponse};
use crate::shared::authorization_service::{checks, FORBIDDEN_MESSAGE};
use crate::shared::error::PlatformError;
use crate::shared::ids::parse_object_id;
use crate::shared::middleware::Authenticated;
use crate::shared::outcome::StepReport;

/// Offer response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub property_id: String,
    pub property_title: String,
    pub property_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_image: Option<String>,
    pub agent_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub buyer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    pub offered_price: f64,
    pub status: OfferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Offer> for OfferResponse {
    fn from(o: Offer) -> Self {
        Self {
            id: o.id.to_hex(),
            property_id: o.property_id,
            property_title: o.property_title,
            property_location: o.property_location,
            property_image: o.property_image,
            agent_email: o.agent_email,
            agent_name: o.agent_name,
            buyer_email: o.buyer_email,
            buyer_name: o.buyer_name,
            offered_price: o.offered_price,
            status: o.status,
            transaction_id: o.transaction_id,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

fn to_responses(offers: Vec<Offer>) -> Vec<OfferResponse> {
    offers.into_iter().map(Into::into).collect()
}

/// Submit offer request; the buyer is always the caller
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOfferRequest {
    pub property_id: String,
    pub offered_price: f64,
    pub buyer_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OfferActionRequest {
    /// Offer ID
    pub id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OfferStatusRequest {
    /// Offer ID
    pub id: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOfferResponse {
    pub message: String,
    pub offer_id: String,
    pub rejected: u64,
    pub steps: Vec<StepReport>,
}

impl From<AcceptOfferOutcome> for AcceptOfferResponse {
    fn from(o: AcceptOfferOutcome) -> Self {
        Self {
            message: "Property status updated successfully".to_string(),
            offer_id: o.offer_id,
            rejected: o.rejected,
            steps: o.steps,
        }
    }
}

/// Offers service state
#[derive(Clone)]
pub struct OffersState {
    pub offer_repo: Arc<dyn OfferRepository>,
    pub submit_use_case: Arc<SubmitOfferUseCase>,
    pub accept_use_case: Arc<AcceptOfferUseCase>,
    pub status_use_case: Arc<SetOfferStatusUseCase>,
}

impl OffersState {
    pub fn new(listing_repo: Arc<dyn ListingRepository>, offer_repo: Arc<dyn OfferRepository>) -> Self {
        Self {
            submit_use_case: Arc::new(SubmitOfferUseCase::new(listing_repo, offer_repo.clone())),
            accept_use_case: Arc::new(AcceptOfferUseCase::new(offer_repo.clone())),
            status_use_case: Arc::new(SetOfferStatusUseCase::new(offer_repo.clone())),
            offer_repo,
        }
    }
}

/// Make an offer on a listing
#[utoipa::path(
    post,
    path = "/offered-property",
    tag = "offers",
    request_body = SubmitOfferRequest,
    responses(
        (status = 200, description = "Offer created (Pending)", body = OfferResponse),
        (status = 400, description = "Price outside range or listing not verified"),
        (status = 404, description = "Listing not found"),
        (status = 409, description = "Caller already made an offer on this listing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_offer(
    State(state): State<OffersState>,
    auth: Authenticated,
    Json(req): Json<SubmitOfferRequest>,
) -> Result<Json<OfferResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let command = SubmitOfferCommand {
        property_id: req.property_id,
        offered_price: req.offered_price,
        buyer_name: req.buyer_name,
    };
    let offer = state.submit_use_case.execute(command, &auth.email).await?;
    Ok(Json(offer.into()))
}

/// Accept an offer and reject every competing offer on the listing
#[utoipa::path(
    patch,
    path = "/offered-property-action",
    tag = "offers",
    request_body = OfferActionRequest,
    responses(
        (status = 200, description = "Offer accepted", body = AcceptOfferResponse),
        (status = 207, description = "Accepted, but competing offers were not all rejected"),
        (status = 403, description = "Not the listing agent"),
        (status = 404, description = "Offer not found"),
        (status = 409, description = "Offer already rejected or bought")
    ),
    security(("bearer_auth" = []))
)]
pub async fn accept_offer(
    State(state): State<OffersState>,
    auth: Authenticated,
    Json(req): Json<OfferActionRequest>,
) -> Result<Json<AcceptOfferResponse>, PlatformError> {
    checks::require_agent(&auth.0)?;

    let command = AcceptOfferCommand { offer_id: parse_object_id(&req.id)? };
    let outcome = state.accept_use_case.execute(command, &auth.email).await?;
    Ok(Json(outcome.into()))
}

/// Reject (or reopen) a single offer
#[utoipa::path(
    patch,
    path = "/offer-reject",
    tag = "offers",
    request_body = OfferStatusRequest,
    responses(
        (status = 200, description = "Offer status updated", body = MessageResponse),
        (status = 400, description = "Status not settable here"),
        (status = 403, description = "Not the listing agent"),
        (status = 404, description = "Offer not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_offer_status(
    State(state): State<OffersState>,
    auth: Authenticated,
    Json(req): Json<OfferStatusRequest>,
) -> Result<Json<MessageResponse>, PlatformError> {
    checks::require_agent(&auth.0)?;

    let command = SetOfferStatusCommand {
        offer_id: parse_object_id(&req.id)?,
        status: req.status.parse()?,
    };
    state.status_use_case.execute(command, &auth.email).await?;
    Ok(Json(MessageResponse::new("Offer status updated")))
}

/// Offers received on the calling agent's listings
#[utoipa::path(
    get,
    path = "/offered-properties",
    tag = "offers",
    params(EmailQuery),
    responses(
        (status = 200, description = "Offers, newest first", body = Vec<OfferResponse>),
        (status = 403, description = "Agent only, own offers")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_agent_offers(
    State(state): State<OffersState>,
    auth: Authenticated,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<OfferResponse>>, PlatformError> {
    checks::require_agent(&auth.0)?;
    let email = query.email.unwrap_or_else(|| auth.email.clone());
    checks::require_self_or_admin(&auth.0, &email)?;
    Ok(Json(to_responses(state.offer_repo.find_by_agent(&email).await?)))
}

/// Offers the calling buyer has made, in any status
#[utoipa::path(
    get,
    path = "/bought-property",
    tag = "offers",
    params(EmailQuery),
    responses(
        (status = 200, description = "Offers, newest first", body = Vec<OfferResponse>),
        (status = 403, description = "Own offers only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_buyer_offers(
    State(state): State<OffersState>,
    auth: Authenticated,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<OfferResponse>>, PlatformError> {
    let email = query.email.unwrap_or_else(|| auth.email.clone());
    checks::require_self_or_admin(&auth.0, &email)?;
    Ok(Json(to_responses(state.offer_repo.find_by_buyer(&email).await?)))
}

/// A single offer, for the checkout page
#[utoipa::path(
    get,
    path = "/payment-property/{id}",
    tag = "offers",
    params(("id" = String, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer found", body = OfferResponse),
        (status = 403, description = "Caller is neither buyer nor agent"),
        (status = 404, description = "Offer not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_offer(
    State(state): State<OffersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<OfferResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let oid = parse_object_id(&id)?;
    let offer = state.offer_repo.find_by_id(&oid).await?
        .ok_or_else(|| PlatformError::not_found("Offer", &id))?;

    if !offer.involves(&auth.email) && !auth.is_admin() {
        return Err(PlatformError::forbidden(FORBIDDEN_MESSAGE));
    }
    Ok(Json(offer.into()))
}

/// Create offers router
pub fn offers_router(state: OffersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(submit_offer))
        .routes(routes!(accept_offer))
        .routes(routes!(set_offer_status))
        .routes(routes!(list_agent_offers))
        .routes(routes!(list_buyer_offers))
        .routes(routes!(get_offer))
        .with_state(state)
}
