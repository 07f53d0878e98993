use axum::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::utils::AppError;

/// JSON body whose rejections use the uniform error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejections use the uniform error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Optional JSON body. An empty body gives `T::default()`; anything else
/// must be valid JSON for `T`.
pub struct JsonOrDefault<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonOrDefault<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        let Json(value) = Json::<T>::from_bytes(&body)?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Note {
        note: Option<String>,
    }

    async fn extract(body: &'static str) -> Result<Note, AppError> {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap();
        JsonOrDefault::<Note>::from_request(request, &())
            .await
            .map(|JsonOrDefault(note)| note)
    }

    #[tokio::test]
    async fn test_empty_body_is_default() {
        assert_eq!(extract("").await.unwrap(), Note::default());
        assert_eq!(extract(" \n").await.unwrap(), Note::default());
    }

    #[tokio::test]
    async fn test_body_is_parsed() {
        let note = extract(r#"{"note":"Bringe Kuchen"}"#).await.unwrap();
        assert_eq!(note.note.as_deref(), Some("Bringe Kuchen"));
    }

    #[tokio::test]
    async fn test_wrong_type_is_rejected() {
        assert!(matches!(
            extract(r#"{"note":42}"#).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            extract("not json").await,
            Err(AppError::Validation(_))
        ));
    }
}
