use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::calendar;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcalQuery {
    pub event_id: Option<String>,
}

#[derive(Serialize)]
struct IcalError {
    error: String,
}

fn bad_request(message: impl Into<String>) -> Response {
    let body = IcalError {
        error: message.into(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// `GET /api/ical?eventId=<id>`: downloads one event as an `.ics` file.
/// Every failure is answered with `400 {"error": ..}`.
pub async fn export_event(
    State(state): State<AppState>,
    Query(query): Query<IcalQuery>,
) -> Response {
    let Some(raw_id) = query.event_id.filter(|id| !id.trim().is_empty()) else {
        return bad_request("eventId is required");
    };
    let Ok(event_id) = Uuid::parse_str(raw_id.trim()) else {
        return bad_request("Event not found");
    };

    match calendar::export(&state, event_id).await {
        Ok(export) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.filename()),
                ),
            ],
            export.body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(event_id = %event_id, error = %e, "Calendar export failed");
            bad_request(e.public_message())
        }
    }
}
