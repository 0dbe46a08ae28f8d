//! Report Entity

use std::fmt;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::memory::Document;
use crate::user::entity::normalize_email;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
pub enum ReportStatus {
    #[default]
    Open,
    Removed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Open => "Open",
            ReportStatus::Removed => "Removed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's complaint against a listing, pending admin resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub property_id: String,
    pub property_title: String,
    pub agent_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    pub reporter_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,

    pub description: String,

    #[serde(default)]
    pub status: ReportStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn new(
        property_id: impl Into<String>,
        property_title: impl Into<String>,
        agent_email: impl Into<String>,
        reporter_email: &str,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            property_id: property_id.into(),
            property_title: property_title.into(),
            agent_email: agent_email.into(),
            agent_name: None,
            reporter_email: normalize_email(reporter_email),
            reporter_name: None,
            description: description.into(),
            status: ReportStatus::Open,
            created_at: Utc::now(),
        }
    }
}

impl Document for Report {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}
