//! Wishlist Entry Entity

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::entity::Listing;
use crate::shared::memory::Document;
use crate::user::entity::normalize_email;

/// A buyer's bookmark of a listing, carrying a snapshot of the listing
/// summary taken when it was added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub property_id: String,
    pub title: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub agent_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub minimum_price: f64,
    pub maximum_price: f64,

    pub buyer_email: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl WishlistEntry {
    pub fn new(listing: &Listing, buyer_email: &str) -> Self {
        Self {
            id: ObjectId::new(),
            property_id: listing.id.to_hex(),
            title: listing.title.clone(),
            location: listing.location.clone(),
            image: listing.image.clone(),
            agent_email: listing.agent_email.clone(),
            agent_name: listing.agent_name.clone(),
            minimum_price: listing.minimum_price,
            maximum_price: listing.maximum_price,
            buyer_email: normalize_email(buyer_email),
            created_at: Utc::now(),
        }
    }

    pub fn is_for(&self, listing_id: &str, buyer_email: &str) -> bool {
        self.property_id == listing_id && self.buyer_email.eq_ignore_ascii_case(buyer_email.trim())
    }
}

impl Document for WishlistEntry {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}
