//! Update Profile Use Case

use std::sync::Arc;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shared::error::{PlatformError, Result};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

/// Only display fields; the role is never writable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileCommand {
    pub name: Option<String>,
    pub image: Option<String>,
}

pub struct UpdateProfileUseCase {
    users: Arc<dyn UserRepository>,
}

impl UpdateProfileUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(
        &self,
        user_id: &ObjectId,
        command: UpdateProfileCommand,
        caller_email: &str,
        caller_is_admin: bool,
    ) -> Result<User> {
        let user = self.users.find_by_id(user_id).await?
            .ok_or_else(|| PlatformError::not_found("User", user_id.to_hex()))?;

        if !caller_is_admin && !user.email.eq_ignore_ascii_case(caller_email.trim()) {
            return Err(PlatformError::forbidden("Users can only update their own profile"));
        }
        if command.name.is_none() && command.image.is_none() {
            return Err(PlatformError::validation("nothing to update"));
        }

        self.users.update_profile(user_id, command.name, command.image).await?;

        let updated = self.users.find_by_id(user_id).await?
            .ok_or_else(|| PlatformError::not_found("User", user_id.to_hex()))?;
        info!(user_id = %user_id, "User profile updated");
        Ok(updated)
    }
}
