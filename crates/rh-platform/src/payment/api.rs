//! Payments API

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::offer::repository::OfferRepository;
use crate::payment::entity::Payment;
use crate::payment::operations::{
    CreatePaymentIntentCommand, CreatePaymentIntentUseCase,
    RecordPaymentCommand, RecordPaymentUseCase,
};
use crate::payment::provider::PaymentProvider;
use crate::payment::repository::PaymentRepository;
use crate::shared::api_common::EmailQuery;
use crate::shared::authorization_service::checks;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::shared::outcome::StepReport;

/// Payment response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub bought_id: String,
    pub property_id: String,
    pub property_title: String,
    pub property_location: String,
    pub buyer_email: String,
    pub agent_email: String,
    pub price: f64,
    pub transaction_id: String,
    pub date: String,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id.to_hex(),
            bought_id: p.offer_id,
            property_id: p.property_id,
            property_title: p.property_title,
            property_location: p.property_location,
            buyer_email: p.buyer_email,
            agent_email: p.agent_email,
            price: p.price,
            transaction_id: p.transaction_id,
            date: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInsertResult {
    pub inserted_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferUpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Both sub-results of a settlement
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentResponse {
    pub payment_result: PaymentInsertResult,
    pub update_result: OfferUpdateResult,
    pub steps: Vec<StepReport>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Payments service state
#[derive(Clone)]
pub struct PaymentsState {
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub record_use_case: Arc<RecordPaymentUseCase>,
    pub intent_use_case: Arc<CreatePaymentIntentUseCase>,
}

impl PaymentsState {
    pub fn new(
        offer_repo: Arc<dyn OfferRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            record_use_case: Arc::new(RecordPaymentUseCase::new(offer_repo, payment_repo.clone())),
            intent_use_case: Arc::new(CreatePaymentIntentUseCase::new(provider)),
            payment_repo,
        }
    }
}

/// Record a completed payment and settle the offer
#[utoipa::path(
    post,
    path = "/payments",
    tag = "payments",
    request_body = RecordPaymentCommand,
    responses(
        (status = 200, description = "Payment recorded and offer bought", body = RecordPaymentResponse),
        (status = 207, description = "Payment recorded but the offer was not settled"),
        (status = 403, description = "Not the offer's buyer"),
        (status = 404, description = "Offer not found"),
        (status = 409, description = "Offer is not Accepted or is already paid")
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_payment(
    State(state): State<PaymentsState>,
    auth: Authenticated,
    Json(req): Json<RecordPaymentCommand>,
) -> Result<Json<RecordPaymentResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let outcome = state.record_use_case.execute(req, &auth.email).await?;
    let settled = outcome.steps.get(1).map_or(0, |step| step.affected);
    Ok(Json(RecordPaymentResponse {
        payment_result: PaymentInsertResult {
            inserted_id: outcome.payment.id.to_hex(),
        },
        update_result: OfferUpdateResult {
            matched_count: settled,
            modified_count: settled,
        },
        steps: outcome.steps,
    }))
}

/// Create a card payment intent for a price
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    tag = "payments",
    request_body = CreatePaymentIntentCommand,
    responses(
        (status = 200, description = "Client secret for the card form", body = PaymentIntentResponse),
        (status = 400, description = "Price below one cent"),
        (status = 502, description = "Payment provider error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_payment_intent(
    State(state): State<PaymentsState>,
    auth: Authenticated,
    Json(req): Json<CreatePaymentIntentCommand>,
) -> Result<Json<PaymentIntentResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let intent = state.intent_use_case.execute(req).await?;
    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Sales history of the calling agent
#[utoipa::path(
    get,
    path = "/sold-properties",
    tag = "payments",
    params(EmailQuery),
    responses(
        (status = 200, description = "Payments, newest first", body = Vec<PaymentResponse>),
        (status = 403, description = "Agent only, own sales")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_sold(
    State(state): State<PaymentsState>,
    auth: Authenticated,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<PaymentResponse>>, PlatformError> {
    checks::require_agent(&auth.0)?;
    let email = query.email.unwrap_or_else(|| auth.email.clone());
    checks::require_self_or_admin(&auth.0, &email)?;

    let payments = state.payment_repo.find_by_agent(&email).await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

/// Create payments router
pub fn payments_router(state: PaymentsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(record_payment))
        .routes(routes!(create_payment_intent))
        .routes(routes!(list_sold))
        .with_state(state)
}
