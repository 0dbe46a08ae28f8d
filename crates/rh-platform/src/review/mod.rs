//! Review Aggregate

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::Review;
pub use repository::{ReviewRepository, MongoReviewRepository, InMemoryReviewRepository};
pub use api::{reviews_router, ReviewsState};
