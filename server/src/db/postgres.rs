use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{CommentStore, EventStore, SignupStore, SlotStore, StoreError};
use crate::config::DatabaseConfig;
use crate::models::signup::{admit, Refusal};
use crate::models::{
    Claim, Comment, CommentPatch, Event, EventPatch, NewComment, NewEvent, NewSignup, NewSlot,
    Signup, SignupPatch, Slot, SlotPatch, SlotUpdate,
};

const EVENT_COLUMNS: &str =
    "id, user_id, title, description, location, event_date, created_at, updated_at";
const SLOT_COLUMNS: &str = "id, event_id, label, needed_helpers, created_at, updated_at";
const SIGNUP_COLUMNS: &str = "id, slot_id, user_id, note, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, event_id, user_id, content, created_at, updated_at";

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn has_code(err: &sqlx::Error, expected: &str) -> bool {
    matches!(
        err.as_database_error().and_then(|db| db.code()),
        Some(code) if code == expected
    )
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        tracing::info!("Successfully connected to database");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;

        tracing::info!("Migrations run successfully");
        Ok(())
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, owner_id: &str, input: NewEvent) -> Result<Event, StoreError> {
        let sql = format!(
            "INSERT INTO events (id, user_id, title, description, location, event_date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(input.title)
            .bind(input.description)
            .bind(input.location)
            .bind(input.event_date)
            .fetch_one(&self.pool)
            .await?;

        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY event_date ASC, id");
        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn update_event(
        &self,
        id: Uuid,
        patch: EventPatch,
    ) -> Result<Option<Event>, StoreError> {
        let sql = format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = CASE WHEN $4 THEN $5 ELSE location END,
                event_date = COALESCE($6, event_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.location.is_some())
            .bind(patch.location.flatten())
            .bind(patch.event_date)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError> {
        // Slots, their signups and comments go with the event via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SlotStore for PgStore {
    async fn insert_slot(
        &self,
        event_id: Uuid,
        input: NewSlot,
    ) -> Result<Option<Slot>, StoreError> {
        let sql = format!(
            "INSERT INTO slots (id, event_id, label, needed_helpers) \
             VALUES ($1, $2, $3, $4) RETURNING {SLOT_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Slot>(&sql)
            .bind(Uuid::new_v4())
            .bind(event_id)
            .bind(input.label)
            .bind(input.needed_helpers)
            .fetch_one(&self.pool)
            .await;

        match inserted {
            Ok(slot) => Ok(Some(slot)),
            Err(e) if has_code(&e, FOREIGN_KEY_VIOLATION) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_slots(&self, event_id: Uuid) -> Result<Vec<Slot>, StoreError> {
        let sql = format!(
            "SELECT {SLOT_COLUMNS} FROM slots WHERE event_id = $1 ORDER BY created_at ASC, id"
        );
        let slots = sqlx::query_as::<_, Slot>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(slots)
    }

    async fn update_slot(&self, id: Uuid, patch: SlotPatch) -> Result<SlotUpdate, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises this update with concurrent claims on the slot.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM slots WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(SlotUpdate::Missing);
        }

        if let Some(needed_helpers) = patch.needed_helpers {
            let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM signups WHERE slot_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if taken > i64::from(needed_helpers) {
                return Ok(SlotUpdate::BelowSignups { taken });
            }
        }

        let sql = format!(
            r#"
            UPDATE slots
            SET label = CASE WHEN $2 THEN $3 ELSE label END,
                needed_helpers = COALESCE($4, needed_helpers),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SLOT_COLUMNS}
            "#
        );
        let slot = sqlx::query_as::<_, Slot>(&sql)
            .bind(id)
            .bind(patch.label.is_some())
            .bind(patch.label.flatten())
            .bind(patch.needed_helpers)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(SlotUpdate::Updated(slot))
    }

    async fn delete_slot(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM slots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SignupStore for PgStore {
    async fn claim_slot(
        &self,
        slot_id: Uuid,
        user_id: &str,
        input: NewSignup,
    ) -> Result<Claim, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Holding the slot row until commit makes count-and-insert atomic
        // across concurrent claims on the same slot.
        let needed_helpers: Option<i32> =
            sqlx::query_scalar("SELECT needed_helpers FROM slots WHERE id = $1 FOR UPDATE")
                .bind(slot_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(needed_helpers) = needed_helpers else {
            return Ok(Claim::SlotMissing);
        };

        let already_signed_up: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM signups WHERE slot_id = $1 AND user_id = $2)",
        )
        .bind(slot_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM signups WHERE slot_id = $1")
            .bind(slot_id)
            .fetch_one(&mut *tx)
            .await?;

        match admit(needed_helpers, taken, already_signed_up) {
            Err(Refusal::AlreadySignedUp) => return Ok(Claim::AlreadySignedUp),
            Err(Refusal::SlotFull) => return Ok(Claim::SlotFull),
            Ok(()) => {}
        }

        let sql = format!(
            "INSERT INTO signups (id, slot_id, user_id, note) \
             VALUES ($1, $2, $3, $4) RETURNING {SIGNUP_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Signup>(&sql)
            .bind(Uuid::new_v4())
            .bind(slot_id)
            .bind(user_id)
            .bind(input.note)
            .fetch_one(&mut *tx)
            .await;
        let signup = match inserted {
            Ok(signup) => signup,
            Err(e) if has_code(&e, UNIQUE_VIOLATION) => return Ok(Claim::AlreadySignedUp),
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;

        Ok(Claim::Created(signup))
    }

    async fn find_signup(&self, id: Uuid) -> Result<Option<Signup>, StoreError> {
        let sql = format!("SELECT {SIGNUP_COLUMNS} FROM signups WHERE id = $1");
        let signup = sqlx::query_as::<_, Signup>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(signup)
    }

    async fn list_signups_by_slot(&self, slot_id: Uuid) -> Result<Vec<Signup>, StoreError> {
        let sql = format!(
            "SELECT {SIGNUP_COLUMNS} FROM signups WHERE slot_id = $1 ORDER BY created_at ASC, id"
        );
        let signups = sqlx::query_as::<_, Signup>(&sql)
            .bind(slot_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(signups)
    }

    async fn list_signups_by_user(&self, user_id: &str) -> Result<Vec<Signup>, StoreError> {
        let sql = format!(
            "SELECT {SIGNUP_COLUMNS} FROM signups WHERE user_id = $1 ORDER BY created_at ASC, id"
        );
        let signups = sqlx::query_as::<_, Signup>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(signups)
    }

    async fn update_signup(
        &self,
        id: Uuid,
        patch: SignupPatch,
    ) -> Result<Option<Signup>, StoreError> {
        let sql = format!(
            "UPDATE signups SET note = CASE WHEN $2 THEN $3 ELSE note END, updated_at = NOW() \
             WHERE id = $1 RETURNING {SIGNUP_COLUMNS}"
        );
        let signup = sqlx::query_as::<_, Signup>(&sql)
            .bind(id)
            .bind(patch.note.is_some())
            .bind(patch.note.flatten())
            .fetch_optional(&self.pool)
            .await?;

        Ok(signup)
    }

    async fn delete_signup(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM signups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(
        &self,
        event_id: Uuid,
        user_id: &str,
        input: NewComment,
    ) -> Result<Option<Comment>, StoreError> {
        let sql = format!(
            "INSERT INTO comments (id, event_id, user_id, content) \
             VALUES ($1, $2, $3, $4) RETURNING {COMMENT_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Comment>(&sql)
            .bind(Uuid::new_v4())
            .bind(event_id)
            .bind(user_id)
            .bind(input.content)
            .fetch_one(&self.pool)
            .await;

        match inserted {
            Ok(comment) => Ok(Some(comment)),
            Err(e) if has_code(&e, FOREIGN_KEY_VIOLATION) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    async fn list_comments(&self, event_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE event_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(comments)
    }

    async fn update_comment(
        &self,
        id: Uuid,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, StoreError> {
        let sql = format!(
            "UPDATE comments SET content = COALESCE($2, content), updated_at = NOW() \
             WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(patch.content)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
