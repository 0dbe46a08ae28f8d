//! Platform Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use serde::Serialize;
use utoipa::ToSchema;

use super::outcome::StepReport;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("{message}")]
    Duplicate { entity_type: String, message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("{operation} completed partially")]
    PartialFailure { operation: String, steps: Vec<StepReport> },

    #[error("Payment provider error: {message}")]
    Payment { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn payment(message: impl Into<String>) -> Self {
        Self::Payment { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn partial(operation: impl Into<String>, steps: Vec<StepReport>) -> Self {
        Self::PartialFailure {
            operation: operation.into(),
            steps,
        }
    }

    /// Store rejected an insert because of a unique index (E11000).
    pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
        use mongodb::error::{ErrorKind, WriteFailure};
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == 11000,
            _ => false,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PlatformError::NotFound { .. } => StatusCode::NOT_FOUND,
            PlatformError::Duplicate { .. } => StatusCode::CONFLICT,
            PlatformError::Conflict { .. } => StatusCode::CONFLICT,
            PlatformError::Validation { .. } => StatusCode::BAD_REQUEST,
            PlatformError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            PlatformError::TokenExpired => StatusCode::UNAUTHORIZED,
            PlatformError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            PlatformError::Forbidden { .. } => StatusCode::FORBIDDEN,
            PlatformError::PartialFailure { .. } => StatusCode::MULTI_STATUS,
            PlatformError::Payment { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PlatformError::NotFound { .. } => "NOT_FOUND",
            PlatformError::Duplicate { .. } => "DUPLICATE",
            PlatformError::Conflict { .. } => "CONFLICT",
            PlatformError::Validation { .. } => "VALIDATION_ERROR",
            PlatformError::Unauthorized { .. } => "UNAUTHORIZED",
            PlatformError::TokenExpired => "TOKEN_EXPIRED",
            PlatformError::InvalidToken { .. } => "INVALID_TOKEN",
            PlatformError::Forbidden { .. } => "FORBIDDEN",
            PlatformError::PartialFailure { .. } => "PARTIAL_FAILURE",
            PlatformError::Payment { .. } => "PAYMENT_PROVIDER_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Sub-step outcomes of a partially applied compound operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepReport>>,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            steps: match self {
                PlatformError::PartialFailure { steps, .. } => Some(steps),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::outcome::StepReport;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PlatformError::not_found("Offer", "x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(PlatformError::duplicate("Offer", "dup").status_code(), StatusCode::CONFLICT);
        assert_eq!(PlatformError::conflict("state").status_code(), StatusCode::CONFLICT);
        assert_eq!(PlatformError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(PlatformError::unauthorized("no").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(PlatformError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(PlatformError::forbidden("no").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(PlatformError::payment("down").status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(PlatformError::internal("boom").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_partial_failure_keeps_steps() {
        let err = PlatformError::partial(
            "resolve report",
            vec![StepReport::completed("delete listing", 1), StepReport::failed("delete reviews", "down")],
        );
        assert_eq!(err.status_code(), StatusCode::MULTI_STATUS);
        match err {
            PlatformError::PartialFailure { steps, .. } => assert_eq!(steps.len(), 2),
            _ => panic!("expected partial failure"),
        }
    }

    #[test]
    fn test_duplicate_message_is_displayed_verbatim() {
        let err = PlatformError::duplicate("Offer", "You have already offered a price of this property");
        assert_eq!(err.to_string(), "You have already offered a price of this property");
    }
}
