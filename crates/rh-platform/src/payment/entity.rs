//! Payment Entity
//!
//! One row per settled offer. Agent and listing summary are copied from the
//! offer so the agent's sales history needs no join.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::offer::entity::Offer;
use crate::shared::memory::Document;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Settled offer id (hex)
    #[serde(rename = "boughtId")]
    pub offer_id: String,

    pub property_id: String,
    pub property_title: String,
    pub property_location: String,

    pub buyer_email: String,
    pub agent_email: String,

    /// Amount charged, in the listing's currency units
    pub price: f64,

    pub transaction_id: String,

    #[serde(rename = "date", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn for_offer(offer: &Offer, transaction_id: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            offer_id: offer.id.to_hex(),
            property_id: offer.property_id.clone(),
            property_title: offer.property_title.clone(),
            property_location: offer.property_location.clone(),
            buyer_email: offer.buyer_email.clone(),
            agent_email: offer.agent_email.clone(),
            price: offer.offered_price,
            transaction_id: transaction_id.into(),
            created_at: Utc::now(),
        }
    }
}

impl Document for Payment {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}
