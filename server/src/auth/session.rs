use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Caller;
use crate::config::SessionKey;
use crate::state::AppState;

/// Claims read from a session token. `sub` is the identity provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
}

/// Verifies bearer session tokens issued by the identity provider.
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn hs256(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn rs256_pem(pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            key: DecodingKey::from_rsa_pem(pem.as_bytes())?,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    pub fn from_key(key: &SessionKey) -> Result<Self, jsonwebtoken::errors::Error> {
        match key {
            SessionKey::Secret(secret) => Ok(Self::hs256(secret)),
            SessionKey::PublicKeyPem(pem) => Self::rs256_pem(pem),
        }
    }

    /// User id carried by a valid token.
    pub fn verify(&self, token: &str) -> Option<String> {
        match decode::<SessionClaims>(token, &self.key, &self.validation) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                debug!(error = %e, "Rejected session token");
                None
            }
        }
    }

    /// Resolves the caller from the `Authorization: Bearer` header. Any
    /// missing or invalid token yields an anonymous caller.
    pub fn resolve(&self, headers: &HeaderMap) -> Caller {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| self.verify(token.trim()))
            .map(Caller::User)
            .unwrap_or(Caller::Anonymous)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.sessions.resolve(&parts.headers))
    }
}
