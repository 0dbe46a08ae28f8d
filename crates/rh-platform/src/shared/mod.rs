//! Shared Module
//!
//! Cross-cutting concerns and shared utilities.

pub mod error;
pub mod outcome;
pub mod ids;
pub mod memory;
pub mod middleware;
pub mod api_common;
pub mod indexes;
pub mod authorization_service;

pub use error::{PlatformError, Result};
pub use outcome::{StepReport, StepStatus, StepTracker};
pub use middleware::{Authenticated, AppState, AuthLayer};
pub use api_common::{ApiError, MessageResponse, StepsResponse, WriteResponse};
pub use authorization_service::{AuthContext, AuthorizationService, Capability};
pub use indexes::initialize_indexes;
