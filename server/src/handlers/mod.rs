use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod comments;
pub mod events;
pub mod ical;
pub mod roles;
pub mod signups;
pub mod slots;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "helper-server",
    };

    success(payload, "Health check successful")
}
