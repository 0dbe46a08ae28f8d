//! HTTP API tests
//!
//! Exercise the assembled router with in-memory repositories.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rh_platform::listing::{Listing, ListingRepository, VerificationStatus};
use rh_platform::payment::{PaymentIntent, PaymentProvider};
use rh_platform::user::{User, UserRepository, UserRole};
use rh_platform::{build_app, AuthService, Repositories, Result};

struct StubPaymentProvider;

#[async_trait]
impl PaymentProvider for StubPaymentProvider {
    async fn create_intent(&self, amount: i64) -> Result<PaymentIntent> {
        Ok(PaymentIntent {
            id: format!("pi_{amount}"),
            client_secret: format!("pi_{amount}_secret"),
        })
    }
}

struct TestApp {
    router: Router,
    repos: Repositories,
    auth: Arc<AuthService>,
}

impl TestApp {
    fn new() -> Self {
        let repos = Repositories::in_memory();
        let auth = Arc::new(AuthService::new_with_secret(rh_config::AuthConfig {
            secret: "test-secret".to_string(),
            ..Default::default()
        }));
        let (router, _openapi) = build_app(repos.clone(), auth.clone(), Arc::new(StubPaymentProvider));
        Self { router, repos, auth }
    }

    async fn user(&self, email: &str, role: UserRole) -> (User, String) {
        let user = User::new(email).with_role(role);
        self.repos.users.insert_if_absent(&user).await.unwrap();
        let token = self.auth.issue_token(email).unwrap();
        (user, token)
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

mod gate_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/verified-properties", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "unauthorized access");
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let app = TestApp::new();
        let (status, _) = app.send(Method::GET, "/verified-properties", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_buyer_cannot_list_all_properties() {
        let app = TestApp::new();
        let (_, token) = app.user("buyer@example.com", UserRole::Buyer).await;

        let (status, body) = app.send(Method::GET, "/properties", Some(&token), None).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "forbidden access");
    }

    #[tokio::test]
    async fn test_fraud_user_loses_every_capability() {
        let app = TestApp::new();
        let (_, token) = app.user("fraud@example.com", UserRole::Fraud).await;

        let (status, _) = app.send(Method::GET, "/verified-properties", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_issued_token_opens_search() {
        let app = TestApp::new();
        let (status, body) = app
            .send(Method::POST, "/jwt", None, Some(json!({ "email": "new@example.com" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let mut listing = Listing::new("agent@example.com", "Flat", "Dhaka", 100.0, 200.0);
        listing.status = VerificationStatus::Verified;
        app.repos.listings.insert(&listing).await.unwrap();

        let (status, body) = app
            .send(Method::GET, "/verified-properties?status=Verified&page=1&size=10", Some(&token), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["result"][0]["location"], "Dhaka");
    }
}

mod user_tests {
    use super::*;

    #[tokio::test]
    async fn test_registration_is_idempotent() {
        let app = TestApp::new();
        let body = json!({ "email": "jane@example.com", "name": "Jane", "role": "Admin" });

        let (status, created) = app.send(Method::POST, "/users", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["email"], "jane@example.com");
        assert_eq!(created["role"], "Buyer");

        let (status, again) = app.send(Method::POST, "/users", None, Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["message"], "User already created");
    }

    #[tokio::test]
    async fn test_admin_marks_agent_as_fraud() {
        let app = TestApp::new();
        let (_, admin_token) = app.user("admin@example.com", UserRole::Admin).await;
        let (agent, _) = app.user("agent@example.com", UserRole::Agent).await;
        app.repos
            .listings
            .insert(&Listing::new("agent@example.com", "Flat", "Dhaka", 100.0, 200.0))
            .await
            .unwrap();

        let (status, body) = app
            .send(
                Method::PATCH,
                "/users/role",
                Some(&admin_token),
                Some(json!({ "id": agent.id.to_hex(), "role": "Fraud" })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Role updated successfully");
        assert_eq!(body["steps"][1]["affected"], 1);
        assert!(app.repos.listings.find_by_agent("agent@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_public_agent_profile() {
        let app = TestApp::new();
        let (agent, _) = app.user("agent@example.com", UserRole::Agent).await;

        let (status, body) = app
            .send(Method::GET, &format!("/agent-data/{}", agent.id.to_hex()), None, None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "Agent");
    }
}

mod offer_tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_offer_is_conflict() {
        let app = TestApp::new();
        let (_, token) = app.user("buyer@example.com", UserRole::Buyer).await;
        let mut listing = Listing::new("agent@example.com", "Flat", "Dhaka", 100.0, 200.0);
        listing.status = VerificationStatus::Verified;
        app.repos.listings.insert(&listing).await.unwrap();

        let body = json!({ "propertyId": listing.id.to_hex(), "offeredPrice": 150.0 });
        let (status, offer) = app.send(Method::POST, "/offered-property", Some(&token), Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(offer["status"], "Pending");

        let (status, err) = app.send(Method::POST, "/offered-property", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["message"], "You have already offered a price of this property");
    }

    #[tokio::test]
    async fn test_accepting_unknown_offer_is_not_found() {
        let app = TestApp::new();
        let (_, token) = app.user("agent@example.com", UserRole::Agent).await;

        let (status, _) = app
            .send(
                Method::PATCH,
                "/offered-property-action",
                Some(&token),
                Some(json!({ "id": bson::oid::ObjectId::new().to_hex() })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_payment_intent_uses_whole_cents() {
        let app = TestApp::new();
        let (_, token) = app.user("buyer@example.com", UserRole::Buyer).await;

        let (status, body) = app
            .send(Method::POST, "/create-payment-intent", Some(&token), Some(json!({ "price": 150.509 })))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["clientSecret"], "pi_15050_secret");
    }
}
