//! Payment Aggregate
//!
//! Settlement of accepted offers and the card-processor integration.

pub mod entity;
pub mod repository;
pub mod provider;
pub mod operations;
pub mod api;

pub use entity::Payment;
pub use repository::{PaymentRepository, MongoPaymentRepository, InMemoryPaymentRepository};
pub use provider::{PaymentIntent, PaymentProvider, StripePaymentProvider};
pub use api::{payments_router, PaymentsState};
