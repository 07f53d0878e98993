#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

use helper_server::auth::{SessionClaims, SessionVerifier, StaticIdentityProvider};
use helper_server::config::{CalendarSettings, HttpSettings};
use helper_server::db::MemoryStore;
use helper_server::routes::create_routes;
use helper_server::state::AppState;

pub const SESSION_SECRET: &str = "integration-secret";
pub const ADMIN: &str = "user_admin";
pub const HELPER_A: &str = "user_a";
pub const HELPER_B: &str = "user_b";

pub fn app() -> Router {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(StaticIdentityProvider::with_admins([ADMIN])),
        SessionVerifier::hs256(SESSION_SECRET),
        CalendarSettings::default(),
    );
    create_routes(state, &HttpSettings::default())
}

pub fn token(user_id: &str) -> String {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SESSION_SECRET.as_bytes()),
    )
    .unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap()
    }

    pub fn data(&self) -> Value {
        self.json()["data"].clone()
    }
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        headers,
        text: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}
