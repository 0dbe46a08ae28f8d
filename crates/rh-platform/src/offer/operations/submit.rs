//! Submit Offer Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::listing::repository::ListingRepository;
use crate::offer::entity::Offer;
use crate::offer::repository::OfferRepository;
use crate::shared::error::{PlatformError, Result};
use crate::shared::ids::parse_object_id;

pub const DUPLICATE_OFFER_MESSAGE: &str = "You have already offered a price of this property";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOfferCommand {
    pub property_id: String,
    pub offered_price: f64,
    pub buyer_name: Option<String>,
}

/// Creates a `Pending` offer for the calling buyer.
///
/// At most one offer may exist per (listing, buyer). The repository checks
/// and inserts; the unique index on the collection rejects the loser of a
/// concurrent double submission.
pub struct SubmitOfferUseCase {
    listings: Arc<dyn ListingRepository>,
    offers: Arc<dyn OfferRepository>,
}

impl SubmitOfferUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>, offers: Arc<dyn OfferRepository>) -> Self {
        Self { listings, offers }
    }

    pub async fn execute(&self, command: SubmitOfferCommand, buyer_email: &str) -> Result<Offer> {
        let listing_id = parse_object_id(&command.property_id)?;
        let listing = self.listings.find_by_id(&listing_id).await?
            .ok_or_else(|| PlatformError::not_found("Listing", command.property_id.clone()))?;

        if !listing.is_verified() {
            return Err(PlatformError::validation(format!(
                "listing {} is {} and does not accept offers",
                listing.id, listing.status
            )));
        }
        if listing.is_owned_by(buyer_email) {
            return Err(PlatformError::validation("agents cannot make offers on their own listings"));
        }

        let price = command.offered_price;
        if !price.is_finite() || price < listing.minimum_price || price > listing.maximum_price {
            return Err(PlatformError::validation(format!(
                "offered price must be between {} and {}",
                listing.minimum_price, listing.maximum_price
            )));
        }

        let mut offer = Offer::new(&listing, buyer_email, price);
        offer.buyer_name = command.buyer_name;

        if !self.offers.insert_unique(&offer).await? {
            debug!(listing_id = %listing.id, buyer = %offer.buyer_email, "Duplicate offer rejected");
            return Err(PlatformError::duplicate("Offer", DUPLICATE_OFFER_MESSAGE));
        }

        info!(offer_id = %offer.id, listing_id = %offer.property_id, buyer = %offer.buyer_email, "Offer submitted");
        metrics::counter!("platform.offers.submitted_total").increment(1);
        Ok(offer)
    }
}
