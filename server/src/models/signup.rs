use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub user_id: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSignup {
    pub note: Option<String>,
}

/// Fields a volunteer may change on their own signup. Slot and user
/// identifiers are not patchable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPatch {
    /// `null` removes the note.
    #[serde(default, deserialize_with = "super::clearable")]
    pub note: Option<Option<String>>,
}

/// Outcome of the atomic check-and-insert performed when claiming a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    Created(Signup),
    SlotMissing,
    AlreadySignedUp,
    SlotFull,
}

/// Why a slot refuses another signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    AlreadySignedUp,
    SlotFull,
}

/// Admission rule for a new signup, evaluated while the slot is locked.
///
/// `already_signed_up` is checked before capacity so a volunteer retrying
/// on a full slot is told about their existing signup.
pub fn admit(needed_helpers: i32, taken: i64, already_signed_up: bool) -> Result<(), Refusal> {
    if already_signed_up {
        return Err(Refusal::AlreadySignedUp);
    }
    if taken >= i64::from(needed_helpers) {
        return Err(Refusal::SlotFull);
    }
    Ok(())
}

impl Signup {
    pub fn apply(&mut self, patch: SignupPatch, now: DateTime<Utc>) {
        if let Some(note) = patch.note {
            self.note = note;
        }
        self.updated_at = now;
    }
}
