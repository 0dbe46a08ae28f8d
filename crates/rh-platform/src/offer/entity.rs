//! Offer Entity
//!
//! A buyer's proposal against a listing.
//!
//! ```text
//! Pending ──accept──▶ Accepted ──settle──▶ Bought
//!    │
//!    └──reject──▶ Rejected
//! ```
//!
//! `Rejected` and `Bought` are terminal. Accepting one offer rejects every
//! other offer on the same listing.

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::listing::entity::Listing;
use crate::shared::error::PlatformError;
use crate::shared::memory::Document;
use crate::user::entity::normalize_email;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
pub enum OfferStatus {
    #[default]
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "accepted")]
    Accepted,
    #[serde(alias = "rejected")]
    Rejected,
    #[serde(alias = "bought")]
    Bought,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "Pending",
            OfferStatus::Accepted => "Accepted",
            OfferStatus::Rejected => "Rejected",
            OfferStatus::Bought => "Bought",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OfferStatus::Rejected | OfferStatus::Bought)
    }

    /// Transitions an individual offer may take on its own.
    pub fn can_transition_to(&self, next: OfferStatus) -> bool {
        matches!(
            (self, next),
            (OfferStatus::Pending, OfferStatus::Accepted)
                | (OfferStatus::Pending, OfferStatus::Rejected)
                | (OfferStatus::Accepted, OfferStatus::Bought)
        )
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OfferStatus::Pending),
            "accepted" => Ok(OfferStatus::Accepted),
            "rejected" => Ok(OfferStatus::Rejected),
            "bought" => Ok(OfferStatus::Bought),
            _ => Err(PlatformError::validation(format!(
                "unknown offer status '{}', expected Pending, Accepted, Rejected or Bought",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Listing id (hex)
    pub property_id: String,

    pub property_title: String,

    pub property_location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_image: Option<String>,

    /// Copied from the listing when the offer is made
    pub agent_email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    pub buyer_email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,

    pub offered_price: f64,

    #[serde(default)]
    pub status: OfferStatus,

    /// Set on settlement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// New pending offer, denormalizing the listing's agent and summary.
    pub fn new(listing: &Listing, buyer_email: &str, offered_price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            property_id: listing.id.to_hex(),
            property_title: listing.title.clone(),
            property_location: listing.location.clone(),
            property_image: listing.image.clone(),
            agent_email: listing.agent_email.clone(),
            agent_name: listing.agent_name.clone(),
            buyer_email: normalize_email(buyer_email),
            buyer_name: None,
            offered_price,
            status: OfferStatus::Pending,
            transaction_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_for(&self, listing_id: &str, buyer_email: &str) -> bool {
        self.property_id == listing_id && self.buyer_email.eq_ignore_ascii_case(buyer_email.trim())
    }

    pub fn involves(&self, email: &str) -> bool {
        let email = email.trim();
        self.buyer_email.eq_ignore_ascii_case(email) || self.agent_email.eq_ignore_ascii_case(email)
    }
}

impl Document for Offer {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}
