//! Reviews API

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::listing::repository::ListingRepository;
use crate::review::entity::Review;
use crate::review::operations::{AddReviewCommand, AddReviewUseCase, DeleteReviewUseCase};
use crate::review::repository::ReviewRepository;
use crate::shared::api_common::{EmailQuery, WriteResponse};
use crate::shared::authorization_service::checks;
use crate::shared::error::PlatformError;
use crate::shared::ids::parse_object_id;
use crate::shared::middleware::Authenticated;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub property_id: String,
    pub property_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_image: Option<String>,
    pub rating: u8,
    pub review: String,
    pub date: String,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id.to_hex(),
            property_id: r.property_id,
            property_title: r.property_title,
            agent_name: r.agent_name,
            email: r.email,
            reviewer_name: r.reviewer_name,
            reviewer_image: r.reviewer_image,
            rating: r.rating,
            review: r.review,
            date: r.created_at.to_rfc3339(),
        }
    }
}

fn to_responses(reviews: Vec<Review>) -> Vec<ReviewResponse> {
    reviews.into_iter().map(Into::into).collect()
}

/// Add review request; the reviewer is the caller
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewRequest {
    pub property_id: String,
    /// 1 to 5
    pub rating: u8,
    pub review: String,
    pub reviewer_name: Option<String>,
    pub reviewer_image: Option<String>,
}

#[derive(Clone)]
pub struct ReviewsState {
    pub review_repo: Arc<dyn ReviewRepository>,
    pub add_use_case: Arc<AddReviewUseCase>,
    pub delete_use_case: Arc<DeleteReviewUseCase>,
}

impl ReviewsState {
    pub fn new(listing_repo: Arc<dyn ListingRepository>, review_repo: Arc<dyn ReviewRepository>) -> Self {
        Self {
            add_use_case: Arc::new(AddReviewUseCase::new(listing_repo, review_repo.clone())),
            delete_use_case: Arc::new(DeleteReviewUseCase::new(review_repo.clone())),
            review_repo,
        }
    }
}

/// Reviews written by a user
#[utoipa::path(
    get,
    path = "/reviews",
    tag = "reviews",
    params(EmailQuery),
    responses(
        (status = 200, description = "Reviews, newest first", body = Vec<ReviewResponse>),
        (status = 403, description = "Someone else's reviews")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_reviews(
    State(state): State<ReviewsState>,
    auth: Authenticated,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<ReviewResponse>>, PlatformError> {
    checks::require_authenticated(&auth.0)?;
    let email = query.email.unwrap_or_else(|| auth.email.clone());
    checks::require_self_or_admin(&auth.0, &email)?;

    let reviews = state.review_repo.find_by_reviewer(&email).await?;
    Ok(Json(to_responses(reviews)))
}

/// Reviews of one listing
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = "reviews",
    params(("id" = String, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Reviews, newest first", body = Vec<ReviewResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_listing_reviews(
    State(state): State<ReviewsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Vec<ReviewResponse>>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let reviews = state.review_repo.find_by_listing(&id).await?;
    Ok(Json(to_responses(reviews)))
}

/// Every review, for the landing page
#[utoipa::path(
    get,
    path = "/all-reviews",
    tag = "reviews",
    responses(
        (status = 200, description = "Reviews, newest first", body = Vec<ReviewResponse>)
    )
)]
pub async fn list_all_reviews(
    State(state): State<ReviewsState>,
) -> Result<Json<Vec<ReviewResponse>>, PlatformError> {
    let reviews = state.review_repo.find_all().await?;
    Ok(Json(to_responses(reviews)))
}

/// Review a listing
#[utoipa::path(
    post,
    path = "/add-review",
    tag = "reviews",
    request_body = AddReviewRequest,
    responses(
        (status = 200, description = "Review added", body = ReviewResponse),
        (status = 400, description = "Rating out of range or empty text"),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_review(
    State(state): State<ReviewsState>,
    auth: Authenticated,
    Json(req): Json<AddReviewRequest>,
) -> Result<Json<ReviewResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let command = AddReviewCommand {
        property_id: req.property_id,
        rating: req.rating,
        review: req.review,
        reviewer_name: req.reviewer_name,
        reviewer_image: req.reviewer_image,
    };
    let review = state.add_use_case.execute(command, &auth.email).await?;
    Ok(Json(review.into()))
}

/// Delete a review (author or Admin)
#[utoipa::path(
    delete,
    path = "/review/{id}",
    tag = "reviews",
    params(("id" = String, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted", body = WriteResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_review(
    State(state): State<ReviewsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<WriteResponse>, PlatformError> {
    checks::require_authenticated(&auth.0)?;

    let oid = parse_object_id(&id)?;
    state.delete_use_case.execute(&oid, &auth.email, auth.is_admin()).await?;
    Ok(Json(WriteResponse::deleted(1)))
}

pub fn reviews_router(state: ReviewsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_my_reviews))
        .routes(routes!(list_listing_reviews))
        .routes(routes!(list_all_reviews))
        .routes(routes!(add_review))
        .routes(routes!(delete_review))
        .with_state(state)
}
