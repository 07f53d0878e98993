use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::actions::signups;
use crate::auth::Caller;
use crate::models::{NewSignup, SignupPatch};
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::{ApiJson, ApiPath, AppError, JsonOrDefault};

pub async fn list_slot_signups(
    State(state): State<AppState>,
    ApiPath(slot_id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    let signups = signups::list_by_slot(&state, slot_id).await?;
    Ok(success(signups, "Signups retrieved successfully"))
}

pub async fn list_user_signups(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
) -> Result<Response, AppError> {
    let signups = signups::list_by_user(&state, &user_id).await?;
    Ok(success(signups, "Signups retrieved successfully"))
}

/// The body is optional; an empty request signs up without a note.
pub async fn create_signup(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(slot_id): ApiPath<Uuid>,
    JsonOrDefault(input): JsonOrDefault<NewSignup>,
) -> Result<Response, AppError> {
    let signup = signups::create(&state, &caller, slot_id, input).await?;
    Ok(created(signup, "Signup created successfully"))
}

pub async fn update_signup(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<SignupPatch>,
) -> Result<Response, AppError> {
    let signup = signups::update(&state, &caller, id, patch).await?;
    Ok(success(signup, "Signup updated successfully"))
}

pub async fn delete_signup(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    signups::delete(&state, &caller, id).await?;
    Ok(empty_success("Signup deleted successfully"))
}
