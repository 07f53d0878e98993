//! Caller identity and authorization.
//!
//! Every mutating action goes through [`IdentityGate::authorize`] with a
//! [`Policy`]; no action checks roles or ownership by hand.

use std::sync::Arc;

use tracing::warn;

use crate::models::Role;
use crate::utils::AppError;

pub mod clerk;
pub mod identity;
pub mod session;

pub use clerk::ClerkClient;
pub use identity::{IdentityError, IdentityProvider, StaticIdentityProvider};
pub use session::{SessionClaims, SessionVerifier};

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(String),
}

impl Caller {
    pub fn user(id: impl Into<String>) -> Self {
        Caller::User(id.into())
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(id),
        }
    }
}

/// Requirement a caller must meet before an action runs.
#[derive(Debug, Clone, Copy)]
pub enum Policy<'a> {
    /// Any signed-in user.
    Authenticated,
    /// Admin role; the text names the guarded action for the denial message.
    Admin(&'a str),
    /// The caller must be one of the listed owners.
    OwnedBy(&'a [&'a str]),
}

#[derive(Clone)]
pub struct IdentityGate {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityGate {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Role of a user. Provider failures count as a regular user.
    pub async fn role_of(&self, user_id: &str) -> Role {
        match self.provider.get_user(user_id).await {
            Ok(user) => user.role,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Role lookup failed, treating caller as non-admin");
                Role::User
            }
        }
    }

    pub async fn is_admin(&self, user_id: &str) -> bool {
        self.role_of(user_id).await == Role::Admin
    }

    /// Checks `policy` for `caller` and returns the caller's user id.
    pub async fn authorize<'c>(
        &self,
        caller: &'c Caller,
        policy: Policy<'_>,
    ) -> Result<&'c str, AppError> {
        let user_id = caller.user_id().ok_or(AppError::NotAuthenticated)?;

        match policy {
            Policy::Authenticated => Ok(user_id),
            Policy::Admin(action) => {
                if self.is_admin(user_id).await {
                    Ok(user_id)
                } else {
                    warn!(user_id = %user_id, action = %action, "Admin role required");
                    Err(AppError::AccessDenied(format!(
                        "Access denied. Only admins can {}.",
                        action
                    )))
                }
            }
            Policy::OwnedBy(owners) => {
                if owners.iter().any(|owner| *owner == user_id) {
                    Ok(user_id)
                } else {
                    warn!(user_id = %user_id, "Caller does not own the record");
                    Err(AppError::AccessDenied("Access denied".to_string()))
                }
            }
        }
    }

    pub async fn set_role(&self, user_id: &str, role: Role) -> Result<(), IdentityError> {
        self.provider.update_user_role(user_id, role).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::models::IdentityUser;

    struct BrokenProvider;

    #[async_trait]
    impl IdentityProvider for BrokenProvider {
        async fn get_user(&self, _user_id: &str) -> Result<IdentityUser, IdentityError> {
            Err(IdentityError::Unavailable("down".to_string()))
        }

        async fn update_user_role(&self, _user_id: &str, _role: Role) -> Result<(), IdentityError> {
            Err(IdentityError::Unavailable("down".to_string()))
        }
    }

    fn gate_with_admin(admin: &str) -> IdentityGate {
        IdentityGate::new(Arc::new(StaticIdentityProvider::with_admins([admin])))
    }

    #[tokio::test]
    async fn test_anonymous_is_not_authenticated() {
        let gate = gate_with_admin("admin");
        let result = gate.authorize(&Caller::Anonymous, Policy::Authenticated).await;
        assert!(matches!(result, Err(AppError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_admin_policy() {
        let gate = gate_with_admin("admin");

        let admin = Caller::user("admin");
        assert_eq!(
            gate.authorize(&admin, Policy::Admin("create events")).await.unwrap(),
            "admin"
        );

        let user = Caller::user("volunteer");
        match gate.authorize(&user, Policy::Admin("create events")).await {
            Err(AppError::AccessDenied(msg)) => {
                assert_eq!(msg, "Access denied. Only admins can create events.")
            }
            other => panic!("expected access denied, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_owner_policy_accepts_any_listed_owner() {
        let gate = gate_with_admin("admin");
        let owners = ["author", "event_owner"];

        for id in owners {
            let caller = Caller::user(id);
            assert!(gate.authorize(&caller, Policy::OwnedBy(&owners)).await.is_ok());
        }

        // Admins get no special treatment on owned records.
        let admin = Caller::user("admin");
        assert!(matches!(
            gate.authorize(&admin, Policy::OwnedBy(&owners)).await,
            Err(AppError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_fails_closed() {
        let gate = IdentityGate::new(Arc::new(BrokenProvider));
        assert!(!gate.is_admin("admin").await);
        assert_eq!(gate.role_of("admin").await, Role::User);
        assert!(matches!(
            gate.authorize(&Caller::user("admin"), Policy::Admin("delete events")).await,
            Err(AppError::AccessDenied(_))
        ));
    }
}
