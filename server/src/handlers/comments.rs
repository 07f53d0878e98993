use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::actions::comments;
use crate::auth::Caller;
use crate::models::{CommentPatch, NewComment};
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::{ApiJson, ApiPath, AppError};

pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    let comments = comments::list_by_event(&state, event_id).await?;
    Ok(success(comments, "Comments retrieved successfully"))
}

pub async fn create_comment(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewComment>,
) -> Result<Response, AppError> {
    let comment = comments::create(&state, &caller, event_id, input).await?;
    Ok(created(comment, "Comment created successfully"))
}

pub async fn update_comment(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<CommentPatch>,
) -> Result<Response, AppError> {
    let comment = comments::update(&state, &caller, id, patch).await?;
    Ok(success(comment, "Comment updated successfully"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    comments::delete(&state, &caller, id).await?;
    Ok(empty_success("Comment deleted successfully"))
}
