//! Set Offer Status Use Case
//!
//! The agent's single-offer decision. Unlike acceptance it never touches
//! sibling offers.

use std::sync::Arc;
use bson::oid::ObjectId;
use tracing::info;

use crate::offer::entity::OfferStatus;
use crate::offer::repository::OfferRepository;
use crate::shared::error::{PlatformError, Result};

#[derive(Debug, Clone)]
pub struct SetOfferStatusCommand {
    pub offer_id: ObjectId,
    pub status: OfferStatus,
}

pub struct SetOfferStatusUseCase {
    offers: Arc<dyn OfferRepository>,
}

impl SetOfferStatusUseCase {
    pub fn new(offers: Arc<dyn OfferRepository>) -> Self {
        Self { offers }
    }

    pub async fn execute(&self, command: SetOfferStatusCommand, agent_email: &str) -> Result<()> {
        // Accepting goes through AcceptOfferUseCase; Bought only through settlement.
        if !matches!(command.status, OfferStatus::Pending | OfferStatus::Rejected) {
            return Err(PlatformError::validation(format!(
                "status {} cannot be set directly, use Pending or Rejected",
                command.status
            )));
        }

        let id = command.offer_id;
        let offer = self.offers.find_by_id(&id).await?
            .ok_or_else(|| PlatformError::not_found("Offer", id.to_hex()))?;

        if !offer.agent_email.eq_ignore_ascii_case(agent_email.trim()) {
            return Err(PlatformError::forbidden("Only the listing agent can change this offer"));
        }
        if offer.status == OfferStatus::Bought {
            return Err(PlatformError::conflict(format!("offer {} is already Bought", id)));
        }

        if !self.offers.set_status(&id, command.status).await? {
            return Err(PlatformError::not_found("Offer", id.to_hex()));
        }

        info!(offer_id = %id, from = %offer.status, to = %command.status, "Offer status changed");
        Ok(())
    }
}
