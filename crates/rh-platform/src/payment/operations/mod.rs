//! Payment Operations

pub mod record;
pub mod intent;

pub use record::{RecordPaymentCommand, RecordPaymentUseCase, RecordPaymentOutcome, DUPLICATE_PAYMENT_MESSAGE};
pub use intent::{CreatePaymentIntentCommand, CreatePaymentIntentUseCase, price_to_cents};
