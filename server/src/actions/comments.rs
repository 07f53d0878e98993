use tracing::info;
use uuid::Uuid;

use super::require_text;
use crate::auth::{Caller, Policy};
use crate::models::{Comment, CommentPatch, NewComment};
use crate::state::AppState;
use crate::utils::AppError;

fn not_found() -> AppError {
    AppError::NotFound("Comment not found".to_string())
}

fn event_not_found() -> AppError {
    AppError::NotFound("Event not found".to_string())
}

pub async fn create(
    state: &AppState,
    caller: &Caller,
    event_id: Uuid,
    input: NewComment,
) -> Result<Comment, AppError> {
    let user_id = state.gate.authorize(caller, Policy::Authenticated).await?;
    require_text("content", &input.content)?;

    let comment = state
        .store
        .insert_comment(event_id, user_id, input)
        .await?
        .ok_or_else(event_not_found)?;
    info!(comment_id = %comment.id, event_id = %event_id, user_id = %user_id, "Comment created");
    Ok(comment)
}

/// Comments of an event, newest first.
pub async fn list_by_event(state: &AppState, event_id: Uuid) -> Result<Vec<Comment>, AppError> {
    Ok(state.store.list_comments(event_id).await?)
}

async fn find(state: &AppState, id: Uuid) -> Result<Comment, AppError> {
    state.store.find_comment(id).await?.ok_or_else(not_found)
}

pub async fn update(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    patch: CommentPatch,
) -> Result<Comment, AppError> {
    state.gate.authorize(caller, Policy::Authenticated).await?;
    let comment = find(state, id).await?;
    state
        .gate
        .authorize(caller, Policy::OwnedBy(&[comment.user_id.as_str()]))
        .await?;
    if let Some(content) = &patch.content {
        require_text("content", content)?;
    }

    state.store.update_comment(id, patch).await?.ok_or_else(not_found)
}

/// Deletes a comment. Allowed for its author and for the owner of the event
/// it belongs to.
pub async fn delete(state: &AppState, caller: &Caller, id: Uuid) -> Result<(), AppError> {
    let user_id = state.gate.authorize(caller, Policy::Authenticated).await?;
    let comment = find(state, id).await?;
    let event = state
        .store
        .find_event(comment.event_id)
        .await?
        .ok_or_else(event_not_found)?;

    let owners = [comment.user_id.as_str(), event.user_id.as_str()];
    state.gate.authorize(caller, Policy::OwnedBy(&owners)).await?;

    if !state.store.delete_comment(id).await? {
        return Err(not_found());
    }
    info!(comment_id = %id, event_id = %event.id, user_id = %user_id, "Comment deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::actions::events;
    use crate::auth::{SessionVerifier, StaticIdentityProvider};
    use crate::config::CalendarSettings;
    use crate::db::MemoryStore;
    use crate::models::NewEvent;

    fn state() -> AppState {
        AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(StaticIdentityProvider::with_admins(["organizer", "other_admin"])),
            SessionVerifier::hs256("unused"),
            CalendarSettings::default(),
        )
    }

    async fn event(state: &AppState) -> Uuid {
        events::create(
            state,
            &Caller::user("organizer"),
            NewEvent {
                title: "Club night".to_string(),
                description: "Bring friends".to_string(),
                location: None,
                event_date: Utc.with_ymd_and_hms(2025, 5, 9, 19, 30, 0).unwrap(),
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn comment_by(state: &AppState, event_id: Uuid, author: &str) -> Comment {
        create(
            state,
            &Caller::user(author),
            event_id,
            NewComment {
                content: format!("{} will be there", author),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_delete_allowed_for_author_and_event_owner_only() {
        let state = state();
        let event_id = event(&state).await;

        let first = comment_by(&state, event_id, "alice").await;
        let second = comment_by(&state, event_id, "alice").await;

        // Another user, and an admin who does not own the event, are refused.
        for outsider in ["bob", "other_admin"] {
            let result = delete(&state, &Caller::user(outsider), first.id).await;
            assert!(matches!(result, Err(AppError::AccessDenied(_))));
        }

        delete(&state, &Caller::user("alice"), first.id).await.unwrap();
        delete(&state, &Caller::user("organizer"), second.id).await.unwrap();
        assert!(list_by_event(&state, event_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let state = state();
        let event_id = event(&state).await;
        let older = comment_by(&state, event_id, "alice").await;
        let newer = comment_by(&state, event_id, "bob").await;

        let ids: Vec<Uuid> = list_by_event(&state, event_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_create_requires_event_and_content() {
        let state = state();
        let alice = Caller::user("alice");

        let missing = create(
            &state,
            &alice,
            Uuid::new_v4(),
            NewComment {
                content: "Hello".to_string(),
            },
        )
        .await;
        assert!(matches!(missing, Err(AppError::NotFound(msg)) if msg == "Event not found"));

        let event_id = event(&state).await;
        let blank = create(
            &state,
            &alice,
            event_id,
            NewComment {
                content: "   ".to_string(),
            },
        )
        .await;
        assert!(matches!(blank, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_only_author_may_edit() {
        let state = state();
        let event_id = event(&state).await;
        let comment = comment_by(&state, event_id, "alice").await;
        let patch = CommentPatch {
            content: Some("Running late".to_string()),
        };

        let by_owner = update(&state, &Caller::user("organizer"), comment.id, patch.clone()).await;
        assert!(matches!(by_owner, Err(AppError::AccessDenied(_))));

        let updated = update(&state, &Caller::user("alice"), comment.id, patch).await.unwrap();
        assert_eq!(updated.content, "Running late");
        assert!(updated.updated_at >= comment.updated_at);
    }
}
