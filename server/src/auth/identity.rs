use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{IdentityUser, Role};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("identity provider returned status {status}")]
    Status { status: u16 },

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// The two operations the server needs from the identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError>;
    async fn update_user_role(&self, user_id: &str, role: Role) -> Result<(), IdentityError>;
}

/// Roles kept in process memory. Unknown users are regular users.
#[derive(Default)]
pub struct StaticIdentityProvider {
    roles: RwLock<HashMap<String, Role>>,
}

impl StaticIdentityProvider {
    pub fn with_admins<I, S>(admin_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = admin_ids
            .into_iter()
            .map(|id| (id.into(), Role::Admin))
            .collect();
        Self {
            roles: RwLock::new(roles),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError> {
        let roles = self
            .roles
            .read()
            .map_err(|_| IdentityError::Unavailable("role table lock poisoned".to_string()))?;
        let role = roles.get(user_id).copied().unwrap_or(Role::User);
        Ok(IdentityUser {
            id: user_id.to_string(),
            role,
        })
    }

    async fn update_user_role(&self, user_id: &str, role: Role) -> Result<(), IdentityError> {
        let mut roles = self
            .roles
            .write()
            .map_err(|_| IdentityError::Unavailable("role table lock poisoned".to_string()))?;
        roles.insert(user_id.to_string(), role);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_roles() {
        let provider = StaticIdentityProvider::with_admins(["user_admin"]);

        assert_eq!(provider.get_user("user_admin").await.unwrap().role, Role::Admin);
        assert_eq!(provider.get_user("someone").await.unwrap().role, Role::User);

        provider.update_user_role("someone", Role::Admin).await.unwrap();
        assert_eq!(provider.get_user("someone").await.unwrap().role, Role::Admin);
    }
}
