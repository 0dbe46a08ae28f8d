//! Register User Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::user::entity::User;
use crate::user::repository::UserRepository;
use crate::shared::error::{PlatformError, Result};

pub const USER_EXISTS_MESSAGE: &str = "User already created";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserCommand {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    Created(User),
    AlreadyExists,
}

/// Idempotent first-login registration.
///
/// New users always start as `Buyer`; only an Admin can change roles.
pub struct RegisterUserUseCase {
    users: Arc<dyn UserRepository>,
}

impl RegisterUserUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, command: RegisterUserCommand) -> Result<RegisterOutcome> {
        let email = command.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(PlatformError::validation("a valid email is required"));
        }

        let mut user = User::new(email);
        user.name = command.name;
        user.image = command.image;

        if !self.users.insert_if_absent(&user).await? {
            debug!(email = %user.email, "User already registered");
            return Ok(RegisterOutcome::AlreadyExists);
        }

        info!(user_id = %user.id, email = %user.email, "User registered");
        metrics::counter!("platform.users.registered_total").increment(1);
        Ok(RegisterOutcome::Created(user))
    }
}
