//! Volunteer signups.
//!
//! Creating a signup is the one place where concurrent requests compete for
//! the same rows. The check sequence (slot exists, caller not yet signed up,
//! slot not full) runs inside [`crate::db::SignupStore::claim_slot`] as a
//! single atomic step, so two volunteers racing for the last place cannot
//! both get it.

use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{Caller, Policy};
use crate::models::{Claim, NewSignup, Signup, SignupPatch};
use crate::state::AppState;
use crate::utils::AppError;

pub const SLOT_NOT_FOUND: &str = "Slot not found";
pub const ALREADY_SIGNED_UP: &str = "Already signed up for this slot";
pub const SLOT_FULL: &str = "Slot is full";

fn not_found() -> AppError {
    AppError::NotFound("Signup not found".to_string())
}

pub async fn create(
    state: &AppState,
    caller: &Caller,
    slot_id: Uuid,
    input: NewSignup,
) -> Result<Signup, AppError> {
    let user_id = state.gate.authorize(caller, Policy::Authenticated).await?;

    match state.store.claim_slot(slot_id, user_id, input).await? {
        Claim::Created(signup) => {
            info!(signup_id = %signup.id, slot_id = %slot_id, user_id = %user_id, "Signup created");
            Ok(signup)
        }
        Claim::SlotMissing => Err(AppError::NotFound(SLOT_NOT_FOUND.to_string())),
        Claim::AlreadySignedUp => Err(AppError::Conflict(ALREADY_SIGNED_UP.to_string())),
        Claim::SlotFull => {
            debug!(slot_id = %slot_id, user_id = %user_id, "Signup refused, slot full");
            Err(AppError::Conflict(SLOT_FULL.to_string()))
        }
    }
}

pub async fn list_by_slot(state: &AppState, slot_id: Uuid) -> Result<Vec<Signup>, AppError> {
    Ok(state.store.list_signups_by_slot(slot_id).await?)
}

pub async fn list_by_user(state: &AppState, user_id: &str) -> Result<Vec<Signup>, AppError> {
    Ok(state.store.list_signups_by_user(user_id).await?)
}

async fn owned_signup(state: &AppState, caller: &Caller, id: Uuid) -> Result<Signup, AppError> {
    state.gate.authorize(caller, Policy::Authenticated).await?;
    let signup = state.store.find_signup(id).await?.ok_or_else(not_found)?;
    state
        .gate
        .authorize(caller, Policy::OwnedBy(&[signup.user_id.as_str()]))
        .await?;
    Ok(signup)
}

pub async fn update(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    patch: SignupPatch,
) -> Result<Signup, AppError> {
    owned_signup(state, caller, id).await?;

    // Gone if it was deleted between the ownership check and the update.
    state.store.update_signup(id, patch).await?.ok_or_else(not_found)
}

pub async fn delete(state: &AppState, caller: &Caller, id: Uuid) -> Result<(), AppError> {
    let signup = owned_signup(state, caller, id).await?;

    if !state.store.delete_signup(id).await? {
        return Err(not_found());
    }
    info!(signup_id = %id, slot_id = %signup.slot_id, user_id = %signup.user_id, "Signup deleted");
    Ok(())
}
