//! Update Listing Use Case

use std::sync::Arc;
use bson::oid::ObjectId;
use tracing::info;

use crate::listing::entity::{validate_price_range, Listing, ListingChanges};
use crate::listing::repository::ListingRepository;
use crate::shared::error::{PlatformError, Result};

#[derive(Debug, Clone)]
pub struct UpdateListingCommand {
    pub id: ObjectId,
    pub changes: ListingChanges,
}

/// Changes descriptive fields of a listing. Only the owning agent may do so;
/// status and advertise state are not reachable from here.
pub struct UpdateListingUseCase {
    listings: Arc<dyn ListingRepository>,
}

impl UpdateListingUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    pub async fn execute(&self, command: UpdateListingCommand, agent_email: &str) -> Result<Listing> {
        let mut listing = self.listings.find_by_id(&command.id).await?
            .ok_or_else(|| PlatformError::not_found("Listing", command.id.to_hex()))?;

        if !listing.is_owned_by(agent_email) {
            return Err(PlatformError::forbidden("Only the owning agent can edit this listing"));
        }
        if command.changes.is_empty() {
            return Ok(listing);
        }

        let mut preview = listing.clone();
        command.changes.apply(&mut preview);
        validate_price_range(preview.minimum_price, preview.maximum_price)?;

        if !self.listings.update_details(&command.id, &command.changes).await? {
            return Err(PlatformError::not_found("Listing", command.id.to_hex()));
        }
        command.changes.apply(&mut listing);

        info!(listing_id = %listing.id, "Listing updated");
        Ok(listing)
    }
}
