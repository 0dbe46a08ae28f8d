//! Settle Offer Use Case

use std::sync::Arc;
use bson::oid::ObjectId;
use tracing::info;

use crate::offer::repository::OfferRepository;
use crate::shared::error::{PlatformError, Result};

/// Moves an `Accepted` offer to `Bought` and stamps the transaction id.
///
/// The status guard is part of the store write, so an offer that was
/// rejected in the meantime is never marked bought.
pub struct SettleOfferUseCase {
    offers: Arc<dyn OfferRepository>,
}

impl SettleOfferUseCase {
    pub fn new(offers: Arc<dyn OfferRepository>) -> Self {
        Self { offers }
    }

    pub async fn execute(&self, offer_id: &ObjectId, transaction_id: &str) -> Result<()> {
        if transaction_id.trim().is_empty() {
            return Err(PlatformError::validation("transactionId is required"));
        }

        if self.offers.mark_bought(offer_id, transaction_id).await? {
            info!(offer_id = %offer_id, transaction_id, "Offer settled");
            metrics::counter!("platform.offers.settled_total").increment(1);
            return Ok(());
        }

        match self.offers.find_by_id(offer_id).await? {
            None => Err(PlatformError::not_found("Offer", offer_id.to_hex())),
            Some(offer) => Err(PlatformError::conflict(format!(
                "offer {} is {}, only Accepted offers can be settled",
                offer_id, offer.status
            ))),
        }
    }
}
