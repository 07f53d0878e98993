//! Storage ports for events, slots, signups and comments.
//!
//! Actions only talk to [`Store`]. Two adapters implement it: [`PgStore`]
//! for PostgreSQL and [`MemoryStore`] for tests and local runs without a
//! database. Both keep the signup invariants (one signup per user and slot,
//! never more signups than `needed_helpers`) inside a single atomic step.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Claim, Comment, CommentPatch, Event, EventPatch, NewComment, NewEvent, NewSignup, NewSlot,
    Signup, SignupPatch, Slot, SlotPatch, SlotUpdate,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, owner_id: &str, input: NewEvent) -> Result<Event, StoreError>;
    /// All events, earliest `event_date` first.
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, StoreError>;
    async fn update_event(&self, id: Uuid, patch: EventPatch)
        -> Result<Option<Event>, StoreError>;
    /// Removes the event together with its slots, their signups and its
    /// comments. Returns `false` when no event matched.
    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Returns `None` when the parent event does not exist.
    async fn insert_slot(&self, event_id: Uuid, input: NewSlot)
        -> Result<Option<Slot>, StoreError>;
    async fn list_slots(&self, event_id: Uuid) -> Result<Vec<Slot>, StoreError>;
    /// Applies the patch while holding the slot, refusing to shrink capacity
    /// below the signups already taken.
    async fn update_slot(&self, id: Uuid, patch: SlotPatch) -> Result<SlotUpdate, StoreError>;
    /// Removes the slot and its signups.
    async fn delete_slot(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait SignupStore: Send + Sync {
    /// Atomically checks slot existence, uniqueness and capacity, then
    /// inserts the signup.
    async fn claim_slot(
        &self,
        slot_id: Uuid,
        user_id: &str,
        input: NewSignup,
    ) -> Result<Claim, StoreError>;
    async fn find_signup(&self, id: Uuid) -> Result<Option<Signup>, StoreError>;
    async fn list_signups_by_slot(&self, slot_id: Uuid) -> Result<Vec<Signup>, StoreError>;
    async fn list_signups_by_user(&self, user_id: &str) -> Result<Vec<Signup>, StoreError>;
    async fn update_signup(
        &self,
        id: Uuid,
        patch: SignupPatch,
    ) -> Result<Option<Signup>, StoreError>;
    async fn delete_signup(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Returns `None` when the event does not exist.
    async fn insert_comment(
        &self,
        event_id: Uuid,
        user_id: &str,
        input: NewComment,
    ) -> Result<Option<Comment>, StoreError>;
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;
    /// Comments of one event, newest first.
    async fn list_comments(&self, event_id: Uuid) -> Result<Vec<Comment>, StoreError>;
    async fn update_comment(
        &self,
        id: Uuid,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, StoreError>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub trait Store: EventStore + SlotStore + SignupStore + CommentStore {}

impl<T> Store for T where T: EventStore + SlotStore + SignupStore + CommentStore {}
