//! Accept Offer Use Case

use std::sync::Arc;
use bson::oid::ObjectId;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::offer::entity::OfferStatus;
use crate::offer::repository::OfferRepository;
use crate::shared::error::{PlatformError, Result};
use crate::shared::outcome::{StepReport, StepTracker};

const STEPS: &[&str] = &["accept offer", "reject competing offers"];

#[derive(Debug, Clone)]
pub struct AcceptOfferCommand {
    pub offer_id: ObjectId,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOfferOutcome {
    pub offer_id: String,
    /// Sibling offers moved to `Rejected`
    pub rejected: u64,
    pub steps: Vec<StepReport>,
}

/// Accepts one offer and rejects every other offer on the same listing.
///
/// The target is written first. If it no longer matches, nothing else is
/// touched. Siblings are rejected whatever their prior status, so the
/// listing ends with exactly one `Accepted` offer.
pub struct AcceptOfferUseCase {
    offers: Arc<dyn OfferRepository>,
}

impl AcceptOfferUseCase {
    pub fn new(offers: Arc<dyn OfferRepository>) -> Self {
        Self { offers }
    }

    pub async fn execute(&self, command: AcceptOfferCommand, agent_email: &str) -> Result<AcceptOfferOutcome> {
        let id = command.offer_id;
        let offer = self.offers.find_by_id(&id).await?
            .ok_or_else(|| PlatformError::not_found("Offer", id.to_hex()))?;

        if !offer.agent_email.eq_ignore_ascii_case(agent_email.trim()) {
            warn!(offer_id = %id, caller = %agent_email, "Accept attempted on another agent's offer");
            return Err(PlatformError::forbidden("Only the listing agent can accept this offer"));
        }
        if offer.status.is_terminal() {
            return Err(PlatformError::conflict(format!(
                "offer {} is already {} and cannot be accepted",
                id, offer.status
            )));
        }

        let mut tracker = StepTracker::new("accept offer", STEPS);

        let accepted = self.offers.set_status(&id, OfferStatus::Accepted).await?;
        if !accepted {
            return Err(PlatformError::not_found("Offer", id.to_hex()));
        }
        tracker.record(Ok(1))?;

        let rejected = tracker.record(self.offers.reject_siblings(&offer.property_id, &id).await)?;

        info!(
            offer_id = %id,
            listing_id = %offer.property_id,
            rejected,
            "Offer accepted"
        );
        metrics::counter!("platform.offers.accepted_total").increment(1);

        Ok(AcceptOfferOutcome {
            offer_id: id.to_hex(),
            rejected,
            steps: tracker.finish(),
        })
    }
}
