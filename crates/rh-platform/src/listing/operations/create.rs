//! Create Listing Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::listing::entity::{validate_price_range, Listing};
use crate::listing::repository::ListingRepository;
use crate::shared::error::{PlatformError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingCommand {
    pub title: String,
    pub location: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub agent_name: Option<String>,
    pub agent_image: Option<String>,
    pub minimum_price: f64,
    pub maximum_price: f64,
}

/// Inserts a new listing owned by the calling agent, always `Pending`.
///
/// There is no duplicate check: an agent may publish the same description
/// more than once.
pub struct CreateListingUseCase {
    listings: Arc<dyn ListingRepository>,
}

impl CreateListingUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    pub async fn execute(&self, command: CreateListingCommand, agent_email: &str) -> Result<Listing> {
        if command.title.trim().is_empty() {
            return Err(PlatformError::validation("title is required"));
        }
        if command.location.trim().is_empty() {
            return Err(PlatformError::validation("location is required"));
        }
        validate_price_range(command.minimum_price, command.maximum_price)?;

        let mut listing = Listing::new(
            agent_email,
            command.title.trim(),
            command.location.trim(),
            command.minimum_price,
            command.maximum_price,
        );
        listing.image = command.image;
        listing.description = command.description;
        listing.agent_name = command.agent_name;
        listing.agent_image = command.agent_image;

        self.listings.insert(&listing).await?;

        info!(listing_id = %listing.id, agent = %listing.agent_email, "Listing created");
        metrics::counter!("platform.listings.created_total").increment(1);
        Ok(listing)
    }
}
