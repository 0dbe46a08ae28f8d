//! Listing Operations

pub mod create;
pub mod update;
pub mod moderate;
pub mod delete;
pub mod query;

pub use create::{CreateListingCommand, CreateListingUseCase};
pub use update::{UpdateListingCommand, UpdateListingUseCase};
pub use moderate::{
    SetVerificationStatusCommand, SetVerificationStatusUseCase,
    SetAdvertiseCommand, SetAdvertiseUseCase,
};
pub use delete::{DeleteListingCommand, DeleteListingUseCase};
pub use query::SearchListingsUseCase;
