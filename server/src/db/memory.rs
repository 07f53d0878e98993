use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CommentStore, EventStore, SignupStore, SlotStore, StoreError};
use crate::models::signup::{admit, Refusal};
use crate::models::{
    Claim, Comment, CommentPatch, Event, EventPatch, NewComment, NewEvent, NewSignup, NewSlot,
    Signup, SignupPatch, Slot, SlotPatch, SlotUpdate,
};

#[derive(Default)]
struct Tables {
    events: Vec<Event>,
    slots: Vec<Slot>,
    signups: Vec<Signup>,
    comments: Vec<Comment>,
}

impl Tables {
    fn remove_slot_cascade(&mut self, slot_id: Uuid) {
        self.signups.retain(|signup| signup.slot_id != slot_id);
        self.slots.retain(|slot| slot.id != slot_id);
    }
}

/// Process-local store. Every operation runs under one lock, which makes the
/// signup check-and-insert atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, owner_id: &str, input: NewEvent) -> Result<Event, StoreError> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            user_id: owner_id.to_string(),
            title: input.title,
            description: input.description,
            location: input.location,
            event_date: input.event_date,
            created_at: now,
            updated_at: now,
        };
        self.tables()?.events.push(event.clone());
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let mut events = self.tables()?.events.clone();
        events.sort_by_key(|event| event.event_date);
        Ok(events)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.tables()?.events.iter().find(|e| e.id == id).cloned())
    }

    async fn update_event(
        &self,
        id: Uuid,
        patch: EventPatch,
    ) -> Result<Option<Event>, StoreError> {
        let mut tables = self.tables()?;
        Ok(tables.events.iter_mut().find(|e| e.id == id).map(|event| {
            event.apply(patch, Utc::now());
            event.clone()
        }))
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        if tables.events.len() == before {
            return Ok(false);
        }

        let slot_ids: Vec<Uuid> = tables
            .slots
            .iter()
            .filter(|slot| slot.event_id == id)
            .map(|slot| slot.id)
            .collect();
        for slot_id in slot_ids {
            tables.remove_slot_cascade(slot_id);
        }
        tables.comments.retain(|c| c.event_id != id);
        Ok(true)
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn insert_slot(
        &self,
        event_id: Uuid,
        input: NewSlot,
    ) -> Result<Option<Slot>, StoreError> {
        let mut tables = self.tables()?;
        if !tables.events.iter().any(|e| e.id == event_id) {
            return Ok(None);
        }

        let now = Utc::now();
        let slot = Slot {
            id: Uuid::new_v4(),
            event_id,
            label: input.label,
            needed_helpers: input.needed_helpers,
            created_at: now,
            updated_at: now,
        };
        tables.slots.push(slot.clone());
        Ok(Some(slot))
    }

    async fn list_slots(&self, event_id: Uuid) -> Result<Vec<Slot>, StoreError> {
        Ok(self
            .tables()?
            .slots
            .iter()
            .filter(|slot| slot.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn update_slot(&self, id: Uuid, patch: SlotPatch) -> Result<SlotUpdate, StoreError> {
        let mut tables = self.tables()?;
        let taken = tables.signups.iter().filter(|s| s.slot_id == id).count() as i64;

        let Some(slot) = tables.slots.iter_mut().find(|s| s.id == id) else {
            return Ok(SlotUpdate::Missing);
        };
        if let Some(needed_helpers) = patch.needed_helpers {
            if taken > i64::from(needed_helpers) {
                return Ok(SlotUpdate::BelowSignups { taken });
            }
        }

        slot.apply(patch, Utc::now());
        Ok(SlotUpdate::Updated(slot.clone()))
    }

    async fn delete_slot(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        if !tables.slots.iter().any(|s| s.id == id) {
            return Ok(false);
        }
        tables.remove_slot_cascade(id);
        Ok(true)
    }
}

#[async_trait]
impl SignupStore for MemoryStore {
    async fn claim_slot(
        &self,
        slot_id: Uuid,
        user_id: &str,
        input: NewSignup,
    ) -> Result<Claim, StoreError> {
        let mut tables = self.tables()?;
        let Some(needed_helpers) = tables
            .slots
            .iter()
            .find(|s| s.id == slot_id)
            .map(|s| s.needed_helpers)
        else {
            return Ok(Claim::SlotMissing);
        };

        let mut taken = 0_i64;
        let mut already_signed_up = false;
        for signup in tables.signups.iter().filter(|s| s.slot_id == slot_id) {
            taken += 1;
            already_signed_up |= signup.user_id == user_id;
        }

        match admit(needed_helpers, taken, already_signed_up) {
            Err(Refusal::AlreadySignedUp) => return Ok(Claim::AlreadySignedUp),
            Err(Refusal::SlotFull) => return Ok(Claim::SlotFull),
            Ok(()) => {}
        }

        let now = Utc::now();
        let signup = Signup {
            id: Uuid::new_v4(),
            slot_id,
            user_id: user_id.to_string(),
            note: input.note,
            created_at: now,
            updated_at: now,
        };
        tables.signups.push(signup.clone());
        Ok(Claim::Created(signup))
    }

    async fn find_signup(&self, id: Uuid) -> Result<Option<Signup>, StoreError> {
        Ok(self.tables()?.signups.iter().find(|s| s.id == id).cloned())
    }

    async fn list_signups_by_slot(&self, slot_id: Uuid) -> Result<Vec<Signup>, StoreError> {
        Ok(self
            .tables()?
            .signups
            .iter()
            .filter(|s| s.slot_id == slot_id)
            .cloned()
            .collect())
    }

    async fn list_signups_by_user(&self, user_id: &str) -> Result<Vec<Signup>, StoreError> {
        Ok(self
            .tables()?
            .signups
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_signup(
        &self,
        id: Uuid,
        patch: SignupPatch,
    ) -> Result<Option<Signup>, StoreError> {
        let mut tables = self.tables()?;
        Ok(tables.signups.iter_mut().find(|s| s.id == id).map(|signup| {
            signup.apply(patch, Utc::now());
            signup.clone()
        }))
    }

    async fn delete_signup(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.signups.len();
        tables.signups.retain(|s| s.id != id);
        Ok(tables.signups.len() != before)
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(
        &self,
        event_id: Uuid,
        user_id: &str,
        input: NewComment,
    ) -> Result<Option<Comment>, StoreError> {
        let mut tables = self.tables()?;
        if !tables.events.iter().any(|e| e.id == event_id) {
            return Ok(None);
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            event_id,
            user_id: user_id.to_string(),
            content: input.content,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(Some(comment))
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(self.tables()?.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, event_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        // Insertion order is creation order, so reversing gives newest first.
        Ok(self
            .tables()?
            .comments
            .iter()
            .rev()
            .filter(|c| c.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn update_comment(
        &self,
        id: Uuid,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, StoreError> {
        let mut tables = self.tables()?;
        Ok(tables.comments.iter_mut().find(|c| c.id == id).map(|comment| {
            comment.apply(patch, Utc::now());
            comment.clone()
        }))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;

    fn new_event(title: &str, day: u32) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: String::new(),
            location: None,
            event_date: Utc.with_ymd_and_hms(2025, 3, day, 18, 0, 0).unwrap(),
        }
    }

    async fn slot_with_capacity(store: &MemoryStore, needed_helpers: i32) -> (Event, Slot) {
        let event = store.insert_event("admin", new_event("Fest", 1)).await.unwrap();
        let slot = store
            .insert_slot(
                event.id,
                NewSlot {
                    label: None,
                    needed_helpers,
                },
            )
            .await
            .unwrap()
            .unwrap();
        (event, slot)
    }

    #[tokio::test]
    async fn test_events_listed_by_date() {
        let store = MemoryStore::new();
        store.insert_event("admin", new_event("Later", 20)).await.unwrap();
        store.insert_event("admin", new_event("Sooner", 2)).await.unwrap();

        let titles: Vec<String> = store
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
    }

    #[tokio::test]
    async fn test_claim_checks_in_order() {
        let store = MemoryStore::new();
        let (_, slot) = slot_with_capacity(&store, 1).await;

        assert_eq!(
            store
                .claim_slot(Uuid::new_v4(), "a", NewSignup::default())
                .await
                .unwrap(),
            Claim::SlotMissing
        );
        assert!(matches!(
            store.claim_slot(slot.id, "a", NewSignup::default()).await.unwrap(),
            Claim::Created(_)
        ));
        assert_eq!(
            store.claim_slot(slot.id, "a", NewSignup::default()).await.unwrap(),
            Claim::AlreadySignedUp
        );
        assert_eq!(
            store.claim_slot(slot.id, "b", NewSignup::default()).await.unwrap(),
            Claim::SlotFull
        );
    }

    #[tokio::test]
    async fn test_concurrent_claims_never_overfill() {
        let store = Arc::new(MemoryStore::new());
        let (_, slot) = slot_with_capacity(&store, 3).await;

        let slot_id = slot.id;
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .claim_slot(slot_id, &format!("user-{}", i), NewSignup::default())
                    .await
                    .unwrap()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), Claim::Created(_)) {
                created += 1;
            }
        }
        assert_eq!(created, 3);
        assert_eq!(store.list_signups_by_slot(slot.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_event_cascades() {
        let store = MemoryStore::new();
        let (event, slot) = slot_with_capacity(&store, 2).await;
        store.claim_slot(slot.id, "a", NewSignup::default()).await.unwrap();
        store
            .insert_comment(
                event.id,
                "a",
                NewComment {
                    content: "See you there".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(store.delete_event(event.id).await.unwrap());
        assert!(store.list_slots(event.id).await.unwrap().is_empty());
        assert!(store.list_signups_by_user("a").await.unwrap().is_empty());
        assert!(store.list_comments(event.id).await.unwrap().is_empty());
        assert!(!store.delete_event(event.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_slot_capacity_cannot_drop_below_signups() {
        let store = MemoryStore::new();
        let (_, slot) = slot_with_capacity(&store, 3).await;
        store.claim_slot(slot.id, "a", NewSignup::default()).await.unwrap();
        store.claim_slot(slot.id, "b", NewSignup::default()).await.unwrap();

        let shrink = SlotPatch {
            label: None,
            needed_helpers: Some(1),
        };
        assert_eq!(
            store.update_slot(slot.id, shrink).await.unwrap(),
            SlotUpdate::BelowSignups { taken: 2 }
        );

        let exact = SlotPatch {
            label: None,
            needed_helpers: Some(2),
        };
        assert!(matches!(
            store.update_slot(slot.id, exact).await.unwrap(),
            SlotUpdate::Updated(Slot {
                needed_helpers: 2,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_deleting_slot_removes_its_signups() {
        let store = MemoryStore::new();
        let (event, slot) = slot_with_capacity(&store, 2).await;
        let other = store
            .insert_slot(
                event.id,
                NewSlot {
                    label: Some("Abbau".to_string()),
                    needed_helpers: 1,
                },
            )
            .await
            .unwrap()
            .unwrap();
        store.claim_slot(slot.id, "a", NewSignup::default()).await.unwrap();
        store.claim_slot(other.id, "a", NewSignup::default()).await.unwrap();

        assert!(store.delete_slot(slot.id).await.unwrap());

        let remaining = store.list_signups_by_user("a").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].slot_id, other.id);
        assert!(store.list_signups_by_slot(slot.id).await.unwrap().is_empty());
        assert!(!store.delete_slot(slot.id).await.unwrap());
    }
}
