use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    pub event_id: Uuid,
    pub label: Option<String>,
    /// Number of signups the slot accepts before it is full.
    pub needed_helpers: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlot {
    pub label: Option<String>,
    pub needed_helpers: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPatch {
    #[serde(default, deserialize_with = "super::clearable")]
    pub label: Option<Option<String>>,
    pub needed_helpers: Option<i32>,
}

/// Result of a capacity-aware slot update.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotUpdate {
    Updated(Slot),
    Missing,
    /// The requested capacity is lower than the signups already taken.
    BelowSignups { taken: i64 },
}

impl Slot {
    pub fn apply(&mut self, patch: SlotPatch, now: DateTime<Utc>) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(needed_helpers) = patch.needed_helpers {
            self.needed_helpers = needed_helpers;
        }
        self.updated_at = now;
    }
}
