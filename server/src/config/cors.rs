use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// Builds the CORS layer for the configured browser origins.
pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_DISPOSITION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(PREFLIGHT_MAX_AGE_SECS));

    let origins = parse_origins(allowed_origins);
    if origins.is_empty() {
        // Credentials cannot be combined with a wildcard origin.
        tracing::warn!("CORS: No valid origins configured, allowing any origin without credentials");
        layer.allow_origin(AllowOrigin::any())
    } else {
        tracing::info!("CORS: Configured with {} allowed origin(s)", origins.len());
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

fn parse_origins(allowed_origins: &[String]) -> Vec<HeaderValue> {
    allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;

    #[test]
    fn test_default_origins_are_valid() {
        let settings = HttpSettings::default();
        assert_eq!(parse_origins(&settings.allowed_origins).len(), 2);
    }

    #[test]
    fn test_invalid_origins_are_skipped() {
        let origins = vec![
            "https://helfer.example.org".to_string(),
            "bad\norigin".to_string(),
        ];
        assert_eq!(parse_origins(&origins).len(), 1);
    }

    #[test]
    fn test_create_cors_layer_without_origins() {
        let _layer = create_cors_layer(&[]);
    }
}
