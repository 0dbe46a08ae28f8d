//! Change Role Use Case

use std::sync::Arc;
use bson::oid::ObjectId;
use tracing::info;

use crate::listing::repository::ListingRepository;
use crate::shared::error::{PlatformError, Result};
use crate::shared::outcome::{StepReport, StepTracker};
use crate::user::entity::{RoleEffect, UserRole};
use crate::user::repository::UserRepository;

pub const ROLE_UPDATED_MESSAGE: &str = "Role updated successfully";

const STEPS: &[&str] = &["update role", "delete agent listings"];

#[derive(Debug, Clone)]
pub struct ChangeRoleCommand {
    pub user_id: ObjectId,
    pub role: UserRole,
}

/// Admin role change, followed by the entry effects of the new role.
///
/// Effects are keyed on the stored user's email, never on caller input, so
/// marking a user `Fraud` purges exactly that user's listings.
pub struct ChangeRoleUseCase {
    users: Arc<dyn UserRepository>,
    listings: Arc<dyn ListingRepository>,
}

impl ChangeRoleUseCase {
    pub fn new(users: Arc<dyn UserRepository>, listings: Arc<dyn ListingRepository>) -> Self {
        Self { users, listings }
    }

    pub async fn execute(&self, command: ChangeRoleCommand) -> Result<Vec<StepReport>> {
        let user = self.users.find_by_id(&command.user_id).await?
            .ok_or_else(|| PlatformError::not_found("User", command.user_id.to_hex()))?;

        let mut tracker = StepTracker::new("change role", STEPS);

        if !self.users.set_role(&user.id, command.role).await? {
            return Err(PlatformError::not_found("User", user.id.to_hex()));
        }
        tracker.record(Ok(1))?;

        for effect in command.role.entry_effects() {
            match effect {
                RoleEffect::PurgeAgentListings => {
                    let purged = tracker.record(self.listings.delete_by_agent(&user.email).await)?;
                    info!(email = %user.email, purged, "Listings of fraud-flagged user deleted");
                }
            }
        }

        info!(user_id = %user.id, from = %user.role, to = %command.role, "User role changed");
        metrics::counter!("platform.users.role_changes_total", "role" => command.role.as_str()).increment(1);

        Ok(tracker.finish())
    }
}
