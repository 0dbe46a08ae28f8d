//! Review Entity

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::{PlatformError, Result};
use crate::shared::memory::Document;
use crate::user::entity::normalize_email;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub property_id: String,
    pub property_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    /// Reviewer email
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_image: Option<String>,

    pub rating: u8,
    pub review: String,

    #[serde(rename = "date", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        property_id: impl Into<String>,
        property_title: impl Into<String>,
        reviewer_email: &str,
        rating: u8,
        review: impl Into<String>,
    ) -> Result<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(PlatformError::validation(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        Ok(Self {
            id: ObjectId::new(),
            property_id: property_id.into(),
            property_title: property_title.into(),
            agent_name: None,
            email: normalize_email(reviewer_email),
            reviewer_name: None,
            reviewer_image: None,
            rating,
            review: review.into(),
            created_at: Utc::now(),
        })
    }

    pub fn is_written_by(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

impl Document for Review {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}
