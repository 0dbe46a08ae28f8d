//! Delete Listing Use Case

use std::sync::Arc;
use bson::oid::ObjectId;
use tracing::info;

use crate::listing::repository::ListingRepository;
use crate::shared::error::{PlatformError, Result};

#[derive(Debug, Clone)]
pub struct DeleteListingCommand {
    pub id: ObjectId,
}

/// Removes a listing on behalf of its owning agent.
///
/// Offers and wishlist entries that reference the listing are left in
/// place; only report resolution cascades (to reviews).
pub struct DeleteListingUseCase {
    listings: Arc<dyn ListingRepository>,
}

impl DeleteListingUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    pub async fn execute(&self, command: DeleteListingCommand, agent_email: &str) -> Result<()> {
        let listing = self.listings.find_by_id(&command.id).await?
            .ok_or_else(|| PlatformError::not_found("Listing", command.id.to_hex()))?;

        if !listing.is_owned_by(agent_email) {
            return Err(PlatformError::forbidden("Only the owning agent can delete this listing"));
        }

        if self.listings.delete(&command.id).await? == 0 {
            return Err(PlatformError::not_found("Listing", command.id.to_hex()));
        }

        info!(listing_id = %command.id, agent = %agent_email, "Listing deleted");
        Ok(())
    }
}
