//! Residence Hub Platform
//!
//! Property marketplace backend:
//! - Users and roles, with the role gate resolving capabilities per request
//! - Listings with verification and advertisement
//! - Offers, acceptance and settlement through recorded payments
//! - Wishlists, reviews and moderation reports
//!
//! Every aggregate has a Mongo repository and an in-memory one with the
//! same semantics.

pub mod shared;
pub mod auth;
pub mod user;
pub mod listing;
pub mod offer;
pub mod payment;
pub mod wishlist;
pub mod review;
pub mod report;
pub mod app;

pub use app::{build_app, Repositories};
pub use auth::{AccessTokenClaims, AuthService};
pub use shared::{initialize_indexes, PlatformError, Result, StepReport, StepStatus};
