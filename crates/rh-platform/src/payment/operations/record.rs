//! Record Payment Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::offer::entity::OfferStatus;
use crate::offer::operations::SettleOfferUseCase;
use crate::offer::repository::OfferRepository;
use crate::payment::entity::Payment;
use crate::payment::repository::PaymentRepository;
use crate::shared::error::{PlatformError, Result};
use crate::shared::ids::parse_object_id;
use crate::shared::outcome::{StepReport, StepTracker};

const STEPS: &[&str] = &["record payment", "mark offer bought"];

pub const DUPLICATE_PAYMENT_MESSAGE: &str = "This offer has already been paid";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentCommand {
    /// Offer being paid for
    pub bought_id: String,
    /// Provider transaction / payment intent id
    pub transaction_id: String,
}

#[derive(Debug, Clone)]
pub struct RecordPaymentOutcome {
    pub payment: Payment,
    pub steps: Vec<StepReport>,
}

/// Records the buyer's payment and settles the offer.
///
/// Two writes, payment first. If the offer cannot be marked bought after the
/// payment row exists, the caller gets a partial failure naming both steps
/// instead of a plain error, since the charge has been recorded.
pub struct RecordPaymentUseCase {
    offers: Arc<dyn OfferRepository>,
    payments: Arc<dyn PaymentRepository>,
    settle: SettleOfferUseCase,
}

impl RecordPaymentUseCase {
    pub fn new(offers: Arc<dyn OfferRepository>, payments: Arc<dyn PaymentRepository>) -> Self {
        let settle = SettleOfferUseCase::new(offers.clone());
        Self { offers, payments, settle }
    }

    pub async fn execute(&self, command: RecordPaymentCommand, buyer_email: &str) -> Result<RecordPaymentOutcome> {
        let transaction_id = command.transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(PlatformError::validation("transactionId is required"));
        }

        let offer_id = parse_object_id(&command.bought_id)?;
        let offer = self.offers.find_by_id(&offer_id).await?
            .ok_or_else(|| PlatformError::not_found("Offer", command.bought_id.clone()))?;

        if !offer.buyer_email.eq_ignore_ascii_case(buyer_email.trim()) {
            warn!(offer_id = %offer_id, caller = %buyer_email, "Payment attempted for another buyer's offer");
            return Err(PlatformError::forbidden("Only the buyer can pay for this offer"));
        }
        if offer.status != OfferStatus::Accepted {
            return Err(PlatformError::conflict(format!(
                "offer {} is {}, only Accepted offers can be paid",
                offer_id, offer.status
            )));
        }

        let payment = Payment::for_offer(&offer, transaction_id);
        let mut tracker = StepTracker::new("record payment", STEPS);

        if !self.payments.insert_unique(&payment).await? {
            return Err(PlatformError::duplicate("Payment", DUPLICATE_PAYMENT_MESSAGE));
        }
        tracker.record(Ok(1))?;

        // The payment row exists from here on, so every failure is partial.
        if let Err(e) = self.settle.execute(&offer_id, transaction_id).await {
            return Err(tracker.fail(e.to_string()));
        }
        tracker.record(Ok(1))?;

        info!(
            offer_id = %offer_id,
            payment_id = %payment.id,
            transaction_id,
            "Payment recorded and offer settled"
        );
        metrics::counter!("platform.payments.recorded_total").increment(1);

        Ok(RecordPaymentOutcome {
            payment,
            steps: tracker.finish(),
        })
    }
}
