//! Application assembly
//!
//! Wires repositories, use cases and routers into one axum [`Router`] plus
//! the OpenAPI document collected from the handlers.

use std::sync::Arc;

use axum::Router;
use mongodb::Database;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::{Components, OpenApi};
use utoipa_axum::router::OpenApiRouter;

use crate::auth::{auth_router, AuthApiState, AuthService};
use crate::listing::{listings_router, InMemoryListingRepository, ListingRepository, ListingsState, MongoListingRepository};
use crate::offer::{offers_router, InMemoryOfferRepository, MongoOfferRepository, OfferRepository, OffersState};
use crate::payment::{payments_router, InMemoryPaymentRepository, MongoPaymentRepository, PaymentProvider, PaymentRepository, PaymentsState};
use crate::report::{reports_router, InMemoryReportRepository, MongoReportRepository, ReportRepository, ReportsState};
use crate::review::{reviews_router, InMemoryReviewRepository, MongoReviewRepository, ReviewRepository, ReviewsState};
use crate::shared::authorization_service::AuthorizationService;
use crate::shared::middleware::{AppState, AuthLayer};
use crate::user::{users_router, InMemoryUserRepository, MongoUserRepository, UserRepository, UsersState};
use crate::wishlist::{wishlist_router, InMemoryWishlistRepository, MongoWishlistRepository, WishlistRepository, WishlistState};

/// One handle per collection
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub wishlist: Arc<dyn WishlistRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub reports: Arc<dyn ReportRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            users: Arc::new(MongoUserRepository::new(db)),
            listings: Arc::new(MongoListingRepository::new(db)),
            offers: Arc::new(MongoOfferRepository::new(db)),
            payments: Arc::new(MongoPaymentRepository::new(db)),
            wishlist: Arc::new(MongoWishlistRepository::new(db)),
            reviews: Arc::new(MongoReviewRepository::new(db)),
            reports: Arc::new(MongoReportRepository::new(db)),
        }
    }

    /// Process-local store for development and tests
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            listings: Arc::new(InMemoryListingRepository::new()),
            offers: Arc::new(InMemoryOfferRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            wishlist: Arc::new(InMemoryWishlistRepository::new()),
            reviews: Arc::new(InMemoryReviewRepository::new()),
            reports: Arc::new(InMemoryReportRepository::new()),
        }
    }
}

/// Build the platform API.
///
/// The returned router already carries the [`AuthLayer`]; the caller adds
/// transport layers (tracing, CORS) and the documentation UI.
pub fn build_app(
    repos: Repositories,
    auth_service: Arc<AuthService>,
    payment_provider: Arc<dyn PaymentProvider>,
) -> (Router, OpenApi) {
    let app_state = AppState {
        auth_service: auth_service.clone(),
        authz_service: Arc::new(AuthorizationService::new(repos.users.clone())),
    };

    let (router, mut openapi) = OpenApiRouter::new()
        .merge(auth_router(AuthApiState { auth_service }))
        .merge(users_router(UsersState::new(repos.users.clone(), repos.listings.clone())))
        .merge(listings_router(ListingsState::new(repos.listings.clone())))
        .merge(offers_router(OffersState::new(repos.listings.clone(), repos.offers.clone())))
        .merge(payments_router(PaymentsState::new(
            repos.offers.clone(),
            repos.payments.clone(),
            payment_provider,
        )))
        .merge(wishlist_router(WishlistState::new(repos.listings.clone(), repos.wishlist.clone())))
        .merge(reviews_router(ReviewsState::new(repos.listings.clone(), repos.reviews.clone())))
        .merge(reports_router(ReportsState::new(
            repos.listings.clone(),
            repos.reviews.clone(),
            repos.reports.clone(),
        )))
        .split_for_parts();

    openapi.info.title = "Residence Hub API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Property listings, offers and settlement".to_string());
    openapi
        .components
        .get_or_insert_with(Components::new)
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );

    let app = Router::new()
        .merge(router)
        .layer(AuthLayer::new(app_state));

    (app, openapi)
}
