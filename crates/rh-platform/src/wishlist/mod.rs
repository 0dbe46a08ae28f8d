//! Wishlist Aggregate

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::WishlistEntry;
pub use repository::{WishlistRepository, MongoWishlistRepository, InMemoryWishlistRepository};
pub use api::{wishlist_router, WishlistState};
