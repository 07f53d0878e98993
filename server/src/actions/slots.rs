use tracing::info;
use uuid::Uuid;

use super::require_positive;
use crate::auth::{Caller, Policy};
use crate::models::{NewSlot, Slot, SlotPatch, SlotUpdate};
use crate::state::AppState;
use crate::utils::AppError;

fn not_found() -> AppError {
    AppError::NotFound("Slot not found".to_string())
}

pub async fn create(
    state: &AppState,
    caller: &Caller,
    event_id: Uuid,
    input: NewSlot,
) -> Result<Slot, AppError> {
    let user_id = state
        .gate
        .authorize(caller, Policy::Admin("create slots"))
        .await?;
    require_positive("neededHelpers", input.needed_helpers)?;

    let slot = state
        .store
        .insert_slot(event_id, input)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    info!(slot_id = %slot.id, event_id = %event_id, user_id = %user_id, "Slot created");
    Ok(slot)
}

pub async fn list_by_event(state: &AppState, event_id: Uuid) -> Result<Vec<Slot>, AppError> {
    Ok(state.store.list_slots(event_id).await?)
}

pub async fn update(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    patch: SlotPatch,
) -> Result<Slot, AppError> {
    let user_id = state
        .gate
        .authorize(caller, Policy::Admin("edit slots"))
        .await?;
    if let Some(needed_helpers) = patch.needed_helpers {
        require_positive("neededHelpers", needed_helpers)?;
    }

    match state.store.update_slot(id, patch).await? {
        SlotUpdate::Updated(slot) => {
            info!(slot_id = %id, user_id = %user_id, "Slot updated");
            Ok(slot)
        }
        SlotUpdate::Missing => Err(not_found()),
        SlotUpdate::BelowSignups { taken } => Err(AppError::Conflict(format!(
            "Slot already has {} signups",
            taken
        ))),
    }
}

pub async fn delete(state: &AppState, caller: &Caller, id: Uuid) -> Result<(), AppError> {
    let user_id = state
        .gate
        .authorize(caller, Policy::Admin("delete slots"))
        .await?;

    if !state.store.delete_slot(id).await? {
        return Err(not_found());
    }
    info!(slot_id = %id, user_id = %user_id, "Slot deleted");
    Ok(())
}
