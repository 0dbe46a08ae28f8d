//! Payment provider
//!
//! The platform only needs one thing from the card processor: a charge
//! intent for an amount, returned as a secret the browser client can
//! confirm. [`StripePaymentProvider`] talks to the Stripe REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use rh_config::PaymentsConfig;
use crate::shared::error::{PlatformError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a card charge intent for `amount` minor units (cents).
    async fn create_intent(&self, amount: i64) -> Result<PaymentIntent>;
}

#[derive(Debug, Deserialize)]
struct StripeIntentResponse {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: Option<String>,
}

pub struct StripePaymentProvider {
    http_client: reqwest::Client,
    secret_key: String,
    api_base: String,
    currency: String,
}

impl StripePaymentProvider {
    pub fn new(config: &PaymentsConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlatformError::Configuration {
                message: format!("Failed to build payment HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            secret_key: config.stripe_secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
        })
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentProvider {
    async fn create_intent(&self, amount: i64) -> Result<PaymentIntent> {
        if self.secret_key.is_empty() {
            return Err(PlatformError::Configuration {
                message: "Stripe secret key is not configured".to_string(),
            });
        }

        let amount = amount.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", self.currency.as_str()),
            ("payment_method_types[]", "card"),
        ];

        let response = self.http_client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| PlatformError::payment(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| status.to_string());
            error!(%status, %detail, "Payment intent creation failed");
            metrics::counter!("platform.payments.intent_failures_total").increment(1);
            return Err(PlatformError::payment(detail));
        }

        let intent: StripeIntentResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::payment(format!("unexpected response: {}", e)))?;

        debug!(intent_id = %intent.id, "Payment intent created");
        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{MockServer, Mock, ResponseTemplate};
    use wiremock::matchers::{method, path, header, body_string_contains};

    fn config(api_base: &str, key: &str) -> PaymentsConfig {
        PaymentsConfig {
            stripe_secret_key: key.to_string(),
            api_base: api_base.to_string(),
            ..PaymentsConfig::default()
        }
    }

    #[tokio::test]
    async fn test_create_intent_posts_form() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("amount=15050"))
            .and(body_string_contains("currency=usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pi_1",
                "client_secret": "pi_1_secret_abc",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = StripePaymentProvider::new(&config(&server.uri(), "sk_test_123")).unwrap();
        let intent = provider.create_intent(15050).await.unwrap();

        assert_eq!(intent.id, "pi_1");
        assert_eq!(intent.client_secret, "pi_1_secret_abc");
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_payment_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": { "message": "Your card was declined." }
            })))
            .mount(&server)
            .await;

        let provider = StripePaymentProvider::new(&config(&server.uri(), "sk_test_123")).unwrap();
        let err = provider.create_intent(100).await.unwrap_err();

        match err {
            PlatformError::Payment { message } => assert_eq!(message, "Your card was declined."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let provider = StripePaymentProvider::new(&config("http://127.0.0.1:1", "")).unwrap();
        let err = provider.create_intent(100).await.unwrap_err();
        assert!(matches!(err, PlatformError::Configuration { .. }));
    }
}
