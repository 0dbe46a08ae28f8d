//! Authorization Service
//!
//! Role gate in front of every mutation. The caller's role is read from the
//! user store on each request, so a downgrade (for example to `Fraud`)
//! applies from the very next call.

use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::{debug, warn};

use crate::auth::AccessTokenClaims;
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::{normalize_email, UserRole};
use crate::user::repository::UserRepository;

pub const FORBIDDEN_MESSAGE: &str = "forbidden access";

/// Permission level an operation requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any caller with a valid token who is not flagged as fraud
    Authenticated,
    Agent,
    Admin,
}

/// Authorization context for a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Email from the verified token
    pub email: String,

    /// Stored user id, if the caller has registered
    pub user_id: Option<ObjectId>,

    /// Stored role at the time of the request
    pub role: Option<UserRole>,
}

impl AuthContext {
    pub fn has_capability(&self, capability: Capability) -> bool {
        match (capability, self.role) {
            (_, Some(UserRole::Fraud)) => false,
            (Capability::Authenticated, _) => true,
            (Capability::Agent, Some(UserRole::Agent)) => true,
            (Capability::Admin, Some(UserRole::Admin)) => true,
            _ => false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.has_capability(Capability::Admin)
    }

    pub fn is_self(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

pub struct AuthorizationService {
    users: Arc<dyn UserRepository>,
}

impl AuthorizationService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Build an authorization context from verified token claims
    pub async fn build_context(&self, claims: &AccessTokenClaims) -> Result<AuthContext> {
        let email = normalize_email(&claims.email);
        let user = self.users.find_by_email(&email).await?;

        debug!(email = %email, role = ?user.as_ref().map(|u| u.role), "Resolved caller role");
        Ok(AuthContext {
            email,
            user_id: user.as_ref().map(|u| u.id),
            role: user.map(|u| u.role),
        })
    }

    pub fn require(&self, context: &AuthContext, capability: Capability) -> Result<()> {
        checks::require(context, capability)
    }
}

/// Common authorization checks
pub mod checks {
    use super::*;

    pub fn require(context: &AuthContext, capability: Capability) -> Result<()> {
        if context.has_capability(capability) {
            return Ok(());
        }
        warn!(email = %context.email, role = ?context.role, required = ?capability, "Forbidden");
        metrics::counter!("platform.authz.denied_total").increment(1);
        Err(PlatformError::forbidden(FORBIDDEN_MESSAGE))
    }

    pub fn require_authenticated(context: &AuthContext) -> Result<()> {
        require(context, Capability::Authenticated)
    }

    pub fn require_agent(context: &AuthContext) -> Result<()> {
        require(context, Capability::Agent)
    }

    pub fn require_admin(context: &AuthContext) -> Result<()> {
        require(context, Capability::Admin)
    }

    /// The caller may only read or act on their own records unless Admin.
    pub fn require_self_or_admin(context: &AuthContext, email: &str) -> Result<()> {
        require_authenticated(context)?;
        if context.is_self(email) || context.is_admin() {
            Ok(())
        } else {
            Err(PlatformError::forbidden(FORBIDDEN_MESSAGE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Option<UserRole>) -> AuthContext {
        AuthContext {
            email: "caller@example.com".to_string(),
            user_id: None,
            role,
        }
    }

    #[test]
    fn test_capabilities_by_role() {
        assert!(ctx(None).has_capability(Capability::Authenticated));
        assert!(!ctx(None).has_capability(Capability::Agent));

        assert!(ctx(Some(UserRole::Agent)).has_capability(Capability::Agent));
        assert!(!ctx(Some(UserRole::Agent)).has_capability(Capability::Admin));

        assert!(ctx(Some(UserRole::Admin)).has_capability(Capability::Admin));
        assert!(!ctx(Some(UserRole::Admin)).has_capability(Capability::Agent));

        assert!(!ctx(Some(UserRole::Buyer)).has_capability(Capability::Agent));
    }

    #[test]
    fn test_fraud_has_no_capabilities() {
        let fraud = ctx(Some(UserRole::Fraud));
        assert!(!fraud.has_capability(Capability::Authenticated));
        assert!(checks::require_authenticated(&fraud).is_err());
    }

    #[test]
    fn test_self_or_admin() {
        let buyer = ctx(Some(UserRole::Buyer));
        assert!(checks::require_self_or_admin(&buyer, "Caller@Example.com").is_ok());
        assert!(checks::require_self_or_admin(&buyer, "other@example.com").is_err());
        assert!(checks::require_self_or_admin(&ctx(Some(UserRole::Admin)), "other@example.com").is_ok());
    }
}
