use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::actions::events;
use crate::auth::Caller;
use crate::models::{EventPatch, NewEvent};
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::{ApiJson, ApiPath, AppError};

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = events::list(&state).await?;
    Ok(success(events, "Events retrieved successfully"))
}

pub async fn get_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    let event = events::get(&state, id).await?;
    Ok(success(event, "Event retrieved successfully"))
}

pub async fn create_event(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(input): ApiJson<NewEvent>,
) -> Result<Response, AppError> {
    let event = events::create(&state, &caller, input).await?;
    Ok(created(event, "Event created successfully"))
}

pub async fn update_event(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<EventPatch>,
) -> Result<Response, AppError> {
    let event = events::update(&state, &caller, id, patch).await?;
    Ok(success(event, "Event updated successfully"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    events::delete(&state, &caller, id).await?;
    Ok(empty_success("Event deleted successfully"))
}
