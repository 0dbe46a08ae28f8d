//! User Aggregate

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{normalize_email, RoleEffect, User, UserRole};
pub use repository::{UserRepository, MongoUserRepository, InMemoryUserRepository};
pub use api::{users_router, UsersState};
