//! Document identifiers
//!
//! Records are keyed by BSON `ObjectId`. Cross-document references
//! (an offer's `propertyId`, a review's `propertyId`, ...) are stored as the
//! 24 character hex form, matching what clients send and receive.

use bson::oid::ObjectId;

use super::error::{PlatformError, Result};

/// Parse a client supplied identifier.
pub fn parse_object_id(value: &str) -> Result<ObjectId> {
    ObjectId::parse_str(value.trim())
        .map_err(|_| PlatformError::validation(format!("'{}' is not a valid identifier", value)))
}
