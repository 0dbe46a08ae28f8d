//! Admin moderation of listings: verification status and advertisement.

use std::sync::Arc;
use bson::oid::ObjectId;
use tracing::info;

use crate::listing::entity::VerificationStatus;
use crate::listing::repository::ListingRepository;
use crate::shared::error::{PlatformError, Result};
use crate::shared::outcome::{StepReport, StepTracker};

const STATUS_STEPS: &[&str] = &["update status", "withdraw advertisement"];

#[derive(Debug, Clone)]
pub struct SetVerificationStatusCommand {
    pub id: ObjectId,
    pub status: VerificationStatus,
}

pub struct SetVerificationStatusUseCase {
    listings: Arc<dyn ListingRepository>,
}

impl SetVerificationStatusUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    pub async fn execute(&self, command: SetVerificationStatusCommand) -> Result<Vec<StepReport>> {
        let listing = self.listings.find_by_id(&command.id).await?
            .ok_or_else(|| PlatformError::not_found("Listing", command.id.to_hex()))?;

        let mut tracker = StepTracker::new("set verification status", STATUS_STEPS);

        if !self.listings.set_status(&command.id, command.status).await? {
            return Err(PlatformError::not_found("Listing", command.id.to_hex()));
        }
        tracker.record(Ok(1))?;

        // Losing verification also withdraws the listing from the public banner.
        if listing.advertise && command.status != VerificationStatus::Verified {
            let withdrawn = self.listings.set_advertise(&command.id, false).await.map(u64::from);
            tracker.record(withdrawn)?;
        }

        info!(listing_id = %command.id, status = %command.status, "Listing status changed");
        Ok(tracker.finish())
    }
}

#[derive(Debug, Clone)]
pub struct SetAdvertiseCommand {
    pub id: ObjectId,
    pub advertise: bool,
}

/// Advertising requires a verified listing; withdrawing is always allowed.
pub struct SetAdvertiseUseCase {
    listings: Arc<dyn ListingRepository>,
}

impl SetAdvertiseUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    pub async fn execute(&self, command: SetAdvertiseCommand) -> Result<()> {
        let listing = self.listings.find_by_id(&command.id).await?
            .ok_or_else(|| PlatformError::not_found("Listing", command.id.to_hex()))?;

        if command.advertise && !listing.is_verified() {
            return Err(PlatformError::validation(format!(
                "listing {} is {} and cannot be advertised until verified",
                listing.id, listing.status
            )));
        }

        if !self.listings.set_advertise(&command.id, command.advertise).await? {
            return Err(PlatformError::not_found("Listing", command.id.to_hex()));
        }

        info!(listing_id = %command.id, advertise = command.advertise, "Listing advertise flag changed");
        Ok(())
    }
}
