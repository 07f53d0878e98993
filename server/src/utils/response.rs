use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Uniform body returned by every action endpoint.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub fn success<T>(data: T, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        message: message.into(),
        data: Some(data),
        code: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn created<T>(data: T, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        message: message.into(),
        data: Some(data),
        code: None,
    };
    (StatusCode::CREATED, Json(body)).into_response()
}

pub fn empty_success(message: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: true,
        message: message.into(),
        data: None,
        code: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn error(code: &str, message: impl Into<String>, status: StatusCode) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        message: message.into(),
        data: None,
        code: Some(code.to_string()),
    };

    (status, Json(body)).into_response()
}
