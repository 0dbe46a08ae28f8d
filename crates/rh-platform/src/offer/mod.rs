//! Offer Aggregate
//!
//! Buyer offers against listings and their accept / reject / settle
//! lifecycle.

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{Offer, OfferStatus};
pub use repository::{OfferRepository, MongoOfferRepository, InMemoryOfferRepository};
pub use api::{offers_router, OffersState};
