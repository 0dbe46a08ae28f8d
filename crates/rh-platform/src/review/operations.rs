//! Review Operations

use std::sync::Arc;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::listing::repository::ListingRepository;
use crate::shared::error::{PlatformError, Result};
use crate::shared::ids::parse_object_id;
use super::entity::Review;
use super::repository::ReviewRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewCommand {
    pub property_id: String,
    pub rating: u8,
    pub review: String,
    pub reviewer_name: Option<String>,
    pub reviewer_image: Option<String>,
}

/// Free insert: a user may review the same listing any number of times.
pub struct AddReviewUseCase {
    listings: Arc<dyn ListingRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl AddReviewUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>, reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { listings, reviews }
    }

    pub async fn execute(&self, command: AddReviewCommand, reviewer_email: &str) -> Result<Review> {
        let listing_id = parse_object_id(&command.property_id)?;
        let listing = self.listings.find_by_id(&listing_id).await?
            .ok_or_else(|| PlatformError::not_found("Listing", command.property_id.clone()))?;

        if command.review.trim().is_empty() {
            return Err(PlatformError::validation("review text is required"));
        }

        let mut review = Review::new(
            listing.id.to_hex(),
            listing.title.clone(),
            reviewer_email,
            command.rating,
            command.review.trim(),
        )?;
        review.agent_name = listing.agent_name.clone();
        review.reviewer_name = command.reviewer_name;
        review.reviewer_image = command.reviewer_image;

        self.reviews.insert(&review).await?;

        info!(review_id = %review.id, listing_id = %review.property_id, "Review added");
        Ok(review)
    }
}

pub struct DeleteReviewUseCase {
    reviews: Arc<dyn ReviewRepository>,
}

impl DeleteReviewUseCase {
    pub fn new(reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { reviews }
    }

    /// `is_admin` lets moderators remove any review; others only their own.
    pub async fn execute(&self, id: &ObjectId, caller_email: &str, is_admin: bool) -> Result<()> {
        let review = self.reviews.find_by_id(id).await?
            .ok_or_else(|| PlatformError::not_found("Review", id.to_hex()))?;

        if !is_admin && !review.is_written_by(caller_email) {
            return Err(PlatformError::forbidden("Only the author can delete this review"));
        }
        if !self.reviews.delete(id).await? {
            return Err(PlatformError::not_found("Review", id.to_hex()));
        }

        info!(review_id = %id, "Review deleted");
        Ok(())
    }
}
