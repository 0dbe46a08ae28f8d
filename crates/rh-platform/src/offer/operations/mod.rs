//! Offer Operations
//!
//! Buyer submission, agent accept / reject, and settlement into `Bought`.

pub mod submit;
pub mod accept;
pub mod set_status;
pub mod settle;

pub use submit::{SubmitOfferCommand, SubmitOfferUseCase, DUPLICATE_OFFER_MESSAGE};
pub use accept::{AcceptOfferCommand, AcceptOfferUseCase, AcceptOfferOutcome};
pub use set_status::{SetOfferStatusCommand, SetOfferStatusUseCase};
pub use settle::SettleOfferUseCase;
