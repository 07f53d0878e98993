use tracing::info;
use uuid::Uuid;

use super::require_text;
use crate::auth::{Caller, Policy};
use crate::models::{Event, EventPatch, NewEvent};
use crate::state::AppState;
use crate::utils::AppError;

fn not_found() -> AppError {
    AppError::NotFound("Event not found".to_string())
}

pub async fn create(state: &AppState, caller: &Caller, input: NewEvent) -> Result<Event, AppError> {
    let user_id = state
        .gate
        .authorize(caller, Policy::Admin("create events"))
        .await?;
    require_text("title", &input.title)?;

    let event = state.store.insert_event(user_id, input).await?;
    info!(event_id = %event.id, user_id = %user_id, "Event created");
    Ok(event)
}

pub async fn list(state: &AppState) -> Result<Vec<Event>, AppError> {
    Ok(state.store.list_events().await?)
}

pub async fn get(state: &AppState, id: Uuid) -> Result<Event, AppError> {
    state.store.find_event(id).await?.ok_or_else(not_found)
}

pub async fn update(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    patch: EventPatch,
) -> Result<Event, AppError> {
    let user_id = state
        .gate
        .authorize(caller, Policy::Admin("edit events"))
        .await?;
    if let Some(title) = &patch.title {
        require_text("title", title)?;
    }

    let event = state.store.update_event(id, patch).await?.ok_or_else(not_found)?;
    info!(event_id = %id, user_id = %user_id, "Event updated");
    Ok(event)
}

pub async fn delete(state: &AppState, caller: &Caller, id: Uuid) -> Result<(), AppError> {
    let user_id = state
        .gate
        .authorize(caller, Policy::Admin("delete events"))
        .await?;

    if !state.store.delete_event(id).await? {
        return Err(not_found());
    }
    info!(event_id = %id, user_id = %user_id, "Event deleted");
    Ok(())
}
