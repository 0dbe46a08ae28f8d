//! Listing Entity
//!
//! A property published by an agent. Listings start `Pending`, an admin
//! verifies or rejects them, and only verified listings can be advertised.

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::error::PlatformError;
use crate::shared::memory::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
pub enum VerificationStatus {
    #[default]
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "verified")]
    Verified,
    #[serde(alias = "rejected")]
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "Pending",
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "rejected" => Ok(VerificationStatus::Rejected),
            _ => Err(PlatformError::validation(format!(
                "unknown verification status '{}', expected Pending, Verified or Rejected",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub title: String,

    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Owning agent
    pub agent_email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_image: Option<String>,

    pub minimum_price: f64,

    pub maximum_price: f64,

    #[serde(default)]
    pub status: VerificationStatus,

    #[serde(default)]
    pub advertise: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(
        agent_email: impl Into<String>,
        title: impl Into<String>,
        location: impl Into<String>,
        minimum_price: f64,
        maximum_price: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            title: title.into(),
            location: location.into(),
            image: None,
            description: None,
            agent_email: crate::user::entity::normalize_email(&agent_email.into()),
            agent_name: None,
            agent_image: None,
            minimum_price,
            maximum_price,
            status: VerificationStatus::Pending,
            advertise: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        self.agent_email.eq_ignore_ascii_case(email.trim())
    }

    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }
}

impl Document for Listing {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}

/// Check a price range supplied by an agent.
pub fn validate_price_range(minimum: f64, maximum: f64) -> Result<(), PlatformError> {
    if !minimum.is_finite() || !maximum.is_finite() || minimum <= 0.0 {
        return Err(PlatformError::validation("prices must be positive numbers"));
    }
    if minimum > maximum {
        return Err(PlatformError::validation("minimum price must not exceed maximum price"));
    }
    Ok(())
}

/// Descriptive fields an owning agent may change after creation.
#[derive(Debug, Clone, Default)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub minimum_price: Option<f64>,
    pub maximum_price: Option<f64>,
}

impl ListingChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.location.is_none()
            && self.image.is_none()
            && self.description.is_none()
            && self.minimum_price.is_none()
            && self.maximum_price.is_none()
    }

    pub fn apply(&self, listing: &mut Listing) {
        if let Some(title) = &self.title {
            listing.title = title.clone();
        }
        if let Some(location) = &self.location {
            listing.location = location.clone();
        }
        if let Some(image) = &self.image {
            listing.image = Some(image.clone());
        }
        if let Some(description) = &self.description {
            listing.description = Some(description.clone());
        }
        if let Some(min) = self.minimum_price {
            listing.minimum_price = min;
        }
        if let Some(max) = self.maximum_price {
            listing.maximum_price = max;
        }
        listing.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_listing_is_pending_and_not_advertised() {
        let listing = Listing::new("Agent@Example.com", "Loft", "Dhaka", 100.0, 200.0);
        assert_eq!(listing.status, VerificationStatus::Pending);
        assert!(!listing.advertise);
        assert!(listing.is_owned_by("agent@example.com"));
    }

    #[test]
    fn test_status_parsing_rejects_unknown_labels() {
        assert_eq!("verified".parse::<VerificationStatus>().unwrap(), VerificationStatus::Verified);
        assert_eq!("Rejected".parse::<VerificationStatus>().unwrap(), VerificationStatus::Rejected);
        assert!("approved".parse::<VerificationStatus>().is_err());
    }

    #[test]
    fn test_price_range_validation() {
        assert!(validate_price_range(100.0, 200.0).is_ok());
        assert!(validate_price_range(200.0, 100.0).is_err());
        assert!(validate_price_range(0.0, 100.0).is_err());
        assert!(validate_price_range(f64::NAN, 100.0).is_err());
    }

    #[test]
    fn test_changes_apply_only_given_fields() {
        let mut listing = Listing::new("a@example.com", "Loft", "Dhaka", 100.0, 200.0);
        let changes = ListingChanges {
            title: Some("Penthouse".to_string()),
            maximum_price: Some(250.0),
            ..Default::default()
        };
        changes.apply(&mut listing);
        assert_eq!(listing.title, "Penthouse");
        assert_eq!(listing.location, "Dhaka");
        assert_eq!(listing.maximum_price, 250.0);
    }
}
