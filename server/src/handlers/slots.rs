use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::actions::slots;
use crate::auth::Caller;
use crate::models::{NewSlot, SlotPatch};
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::{ApiJson, ApiPath, AppError};

pub async fn list_slots(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    let slots = slots::list_by_event(&state, event_id).await?;
    Ok(success(slots, "Slots retrieved successfully"))
}

pub async fn create_slot(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewSlot>,
) -> Result<Response, AppError> {
    let slot = slots::create(&state, &caller, event_id, input).await?;
    Ok(created(slot, "Slot created successfully"))
}

pub async fn update_slot(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<SlotPatch>,
) -> Result<Response, AppError> {
    let slot = slots::update(&state, &caller, id, patch).await?;
    Ok(success(slot, "Slot updated successfully"))
}

pub async fn delete_slot(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    slots::delete(&state, &caller, id).await?;
    Ok(empty_success("Slot deleted successfully"))
}
