//! Listing Aggregate
//!
//! Agent-owned property records with a verification and advertisement
//! lifecycle.

pub mod entity;
pub mod search;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{Listing, ListingChanges, VerificationStatus};
pub use search::{ListingPredicate, ListingSearch, PriceRange, SearchPage};
pub use repository::{ListingRepository, MongoListingRepository, InMemoryListingRepository};
pub use api::{listings_router, ListingsState};
