//! HTTP adapter for a Clerk-compatible user API.
//!
//! Roles live in each user's `public_metadata.role`. Reads use
//! `GET {api}/users/{id}`, writes use `PATCH {api}/users/{id}/metadata`,
//! both authenticated with the backend secret key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::identity::{IdentityError, IdentityProvider};
use crate::models::{IdentityUser, Role};

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    public_metadata: PublicMetadata,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct PublicMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Serialize)]
struct MetadataUpdate {
    public_metadata: PublicMetadata,
}

#[derive(Clone)]
pub struct ClerkClient {
    client: Client,
    api_url: String,
    secret_key: String,
}

impl ClerkClient {
    pub fn new(
        api_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("helper-server/0.1")
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            secret_key: secret_key.into(),
        })
    }

    fn user_url(&self, user_id: &str) -> String {
        format!("{}/users/{}", self.api_url, user_id)
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn get_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError> {
        debug!(user_id = %user_id, "Fetching user from identity provider");

        let response = self
            .client
            .get(self.user_url(user_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(IdentityError::UserNotFound(user_id.to_string())),
            status if !status.is_success() => Err(IdentityError::Status {
                status: status.as_u16(),
            }),
            _ => {
                let payload: UserPayload = response.json().await?;
                Ok(IdentityUser {
                    id: payload.id,
                    role: Role::from_metadata(payload.public_metadata.role.as_deref()),
                })
            }
        }
    }

    async fn update_user_role(&self, user_id: &str, role: Role) -> Result<(), IdentityError> {
        debug!(user_id = %user_id, role = %role, "Updating user role in identity provider");

        let body = MetadataUpdate {
            public_metadata: PublicMetadata {
                role: Some(role.as_str().to_string()),
            },
        };
        let response = self
            .client
            .patch(format!("{}/metadata", self.user_url(user_id)))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(IdentityError::UserNotFound(user_id.to_string())),
            status if !status.is_success() => Err(IdentityError::Status {
                status: status.as_u16(),
            }),
            _ => Ok(()),
        }
    }
}
