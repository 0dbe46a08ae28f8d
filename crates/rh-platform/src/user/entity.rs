//! User Entity
//!
//! Marketplace identity keyed by email. The role decides which capabilities
//! the authorization gate grants; some role transitions carry mandatory side
//! effects listed in [`UserRole::entry_effects`].

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::error::PlatformError;
use crate::shared::memory::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
pub enum UserRole {
    #[default]
    #[serde(alias = "User")]
    Buyer,
    Agent,
    Admin,
    Fraud,
}

/// Side effect that must run when a user enters a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleEffect {
    /// Delete every listing whose agent email is the user's email.
    PurgeAgentListings,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [UserRole::Buyer, UserRole::Agent, UserRole::Admin, UserRole::Fraud];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Buyer => "Buyer",
            UserRole::Agent => "Agent",
            UserRole::Admin => "Admin",
            UserRole::Fraud => "Fraud",
        }
    }

    /// Transition table: effects applied when a user is moved into `self`.
    pub fn entry_effects(&self) -> &'static [RoleEffect] {
        match self {
            UserRole::Fraud => &[RoleEffect::PurgeAgentListings],
            UserRole::Buyer | UserRole::Agent | UserRole::Admin => &[],
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Buyer" | "User" => Ok(UserRole::Buyer),
            "Agent" => Ok(UserRole::Agent),
            "Admin" => Ok(UserRole::Admin),
            "Fraud" => Ok(UserRole::Fraud),
            other => Err(PlatformError::validation(format!(
                "unknown role '{}', expected one of Buyer, Agent, Admin, Fraud",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Unique lookup key
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub role: UserRole,

    #[serde(rename = "date", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            email: normalize_email(&email.into()),
            name: None,
            image: None,
            role: UserRole::Buyer,
            created_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }
}

impl Document for User {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}

/// Emails are compared case-insensitively everywhere.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults_to_buyer() {
        let user = User::new("  Jane@Example.com ");
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.role, UserRole::Buyer);
    }

    #[test]
    fn test_only_fraud_has_entry_effects() {
        for role in UserRole::ALL {
            let effects = role.entry_effects();
            if role == UserRole::Fraud {
                assert_eq!(effects, &[RoleEffect::PurgeAgentListings]);
            } else {
                assert!(effects.is_empty(), "{role} should have no effects");
            }
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Agent".parse::<UserRole>().unwrap(), UserRole::Agent);
        assert_eq!("User".parse::<UserRole>().unwrap(), UserRole::Buyer);
        assert!(matches!("admin".parse::<UserRole>(), Err(PlatformError::Validation { .. })));
    }

    #[test]
    fn test_missing_role_deserializes_as_buyer() {
        let doc = bson::doc! {
            "_id": ObjectId::new(),
            "email": "old@example.com",
            "date": bson::DateTime::now(),
        };
        let user: User = bson::from_document(doc).unwrap();
        assert_eq!(user.role, UserRole::Buyer);
    }
}
