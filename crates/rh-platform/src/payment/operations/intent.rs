//! Create Payment Intent Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::payment::provider::{PaymentIntent, PaymentProvider};
use crate::shared::error::{PlatformError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentCommand {
    pub price: f64,
}

/// Whole cents, truncating any fraction of a cent.
pub fn price_to_cents(price: f64) -> Result<i64> {
    if !price.is_finite() {
        return Err(PlatformError::validation("price must be a number"));
    }
    let cents = (price * 100.0).trunc();
    if cents < 1.0 || cents > i64::MAX as f64 {
        return Err(PlatformError::validation("price must be at least 0.01"));
    }
    Ok(cents as i64)
}

pub struct CreatePaymentIntentUseCase {
    provider: Arc<dyn PaymentProvider>,
}

impl CreatePaymentIntentUseCase {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, command: CreatePaymentIntentCommand) -> Result<PaymentIntent> {
        let amount = price_to_cents(command.price)?;
        let intent = self.provider.create_intent(amount).await?;
        info!(intent_id = %intent.id, amount, "Payment intent created");
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_to_cents_truncates() {
        assert_eq!(price_to_cents(150.5).unwrap(), 15050);
        assert_eq!(price_to_cents(0.019).unwrap(), 1);
        assert_eq!(price_to_cents(12.0).unwrap(), 1200);
    }

    #[test]
    fn test_price_to_cents_rejects_non_positive() {
        assert!(price_to_cents(0.0).is_err());
        assert!(price_to_cents(-5.0).is_err());
        assert!(price_to_cents(0.004).is_err());
        assert!(price_to_cents(f64::NAN).is_err());
    }
}
