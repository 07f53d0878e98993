use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::SecurityHeadersLayer;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CALENDAR_LOCATION: &str = "Lüdenscheider Turnverein 1861 e.V.";
const DEFAULT_CALENDAR_UID_DOMAIN: &str = "helpers.local";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Where roles are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityConfig {
    /// Clerk-compatible user API.
    Remote {
        api_url: String,
        secret_key: String,
        timeout_secs: u64,
    },
    /// Fixed admin list, used when no identity API is configured.
    Static { admin_ids: Vec<String> },
}

/// Key used to verify session tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionKey {
    Secret(String),
    PublicKeyPem(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    /// Venue written into every exported event.
    pub location: String,
    pub uid_domain: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            location: DEFAULT_CALENDAR_LOCATION.to_string(),
            uid_domain: DEFAULT_CALENDAR_UID_DOMAIN.to_string(),
        }
    }
}

/// Browser-facing settings for the HTTP layers.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    pub allowed_origins: Vec<String>,
    /// Enables HSTS.
    pub production: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            allowed_origins: split_list(DEFAULT_ALLOWED_ORIGINS),
            production: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub identity: IdentityConfig,
    pub session: SessionKey,
    pub calendar: CalendarSettings,
    pub http: HttpSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    get("DATABASE_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?,
                acquire_timeout_secs: parse_or(
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    get("DATABASE_ACQUIRE_TIMEOUT_SECS"),
                    DEFAULT_ACQUIRE_TIMEOUT_SECS,
                )?,
            }),
            None => None,
        };

        let identity = match get("IDENTITY_API_URL") {
            Some(api_url) => IdentityConfig::Remote {
                api_url: api_url.trim_end_matches('/').to_string(),
                secret_key: get("IDENTITY_SECRET_KEY")
                    .ok_or(ConfigError::Missing("IDENTITY_SECRET_KEY"))?,
                timeout_secs: parse_or(
                    "IDENTITY_TIMEOUT_SECS",
                    get("IDENTITY_TIMEOUT_SECS"),
                    DEFAULT_IDENTITY_TIMEOUT_SECS,
                )?,
            },
            None => IdentityConfig::Static {
                admin_ids: get("ADMIN_USER_IDS")
                    .map(|ids| split_list(&ids))
                    .unwrap_or_default(),
            },
        };

        let session = match (get("SESSION_PUBLIC_KEY_PEM"), get("SESSION_SECRET")) {
            (Some(pem), _) => SessionKey::PublicKeyPem(pem),
            (None, Some(secret)) => SessionKey::Secret(secret),
            (None, None) => return Err(ConfigError::Missing("SESSION_SECRET")),
        };

        let defaults = CalendarSettings::default();
        let calendar = CalendarSettings {
            location: get("CALENDAR_LOCATION").unwrap_or(defaults.location),
            uid_domain: get("CALENDAR_UID_DOMAIN").unwrap_or(defaults.uid_domain),
        };

        let http = HttpSettings {
            allowed_origins: split_list(
                &get("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
            production: get("RUST_ENV")
                .map(|env| env.trim().eq_ignore_ascii_case("production"))
                .unwrap_or(false),
        };

        Ok(Self {
            bind_addr,
            database,
            identity,
            session,
            calendar,
            http,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => {
            let parsed = value.trim().parse();
            parsed.map_err(|_| ConfigError::Invalid { name, value })
        }
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = config_from(&[("SESSION_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.bind_addr.port(), 3001);
        assert!(config.database.is_none());
        assert_eq!(config.identity, IdentityConfig::Static { admin_ids: vec![] });
        assert_eq!(config.session, SessionKey::Secret("s3cret".to_string()));
        assert_eq!(config.calendar, CalendarSettings::default());
        assert_eq!(config.http, HttpSettings::default());
    }

    #[test]
    fn test_http_settings_from_env() {
        let config = config_from(&[
            ("SESSION_SECRET", "s"),
            ("CORS_ALLOWED_ORIGINS", "https://helfer.example.org , "),
            ("RUST_ENV", "Production"),
        ])
        .unwrap();

        assert_eq!(
            config.http.allowed_origins,
            vec!["https://helfer.example.org".to_string()]
        );
        assert!(config.http.production);
    }

    #[test]
    fn test_session_key_is_required() {
        assert_eq!(
            config_from(&[]).unwrap_err(),
            ConfigError::Missing("SESSION_SECRET")
        );
    }

    #[test]
    fn test_remote_identity_requires_secret_key() {
        let err = config_from(&[
            ("SESSION_SECRET", "s"),
            ("IDENTITY_API_URL", "https://api.clerk.com/v1/"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("IDENTITY_SECRET_KEY"));

        let config = config_from(&[
            ("SESSION_SECRET", "s"),
            ("IDENTITY_API_URL", "https://api.clerk.com/v1/"),
            ("IDENTITY_SECRET_KEY", "sk_test"),
        ])
        .unwrap();
        assert_eq!(
            config.identity,
            IdentityConfig::Remote {
                api_url: "https://api.clerk.com/v1".to_string(),
                secret_key: "sk_test".to_string(),
                timeout_secs: DEFAULT_IDENTITY_TIMEOUT_SECS,
            }
        );
    }

    #[test]
    fn test_admin_ids_and_database_settings() {
        let config = config_from(&[
            ("SESSION_SECRET", "s"),
            ("ADMIN_USER_IDS", "user_a, user_b,,"),
            ("DATABASE_URL", "postgres://localhost/helpers"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();

        assert_eq!(
            config.identity,
            IdentityConfig::Static {
                admin_ids: vec!["user_a".to_string(), "user_b".to_string()]
            }
        );
        let database = config.database.unwrap();
        assert_eq!(database.max_connections, 12);
        assert_eq!(database.acquire_timeout_secs, DEFAULT_ACQUIRE_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_numbers_are_reported() {
        let err = config_from(&[
            ("SESSION_SECRET", "s"),
            ("DATABASE_URL", "postgres://localhost/helpers"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value: "many".to_string()
            }
        );
    }
}
