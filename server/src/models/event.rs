use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    /// Identity of the admin who created the event.
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub event_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
    pub event_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `null` removes the location.
    #[serde(default, deserialize_with = "super::clearable")]
    pub location: Option<Option<String>>,
    pub event_date: Option<DateTime<Utc>>,
}

impl Event {
    pub fn apply(&mut self, patch: EventPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(event_date) = patch.event_date {
            self.event_date = event_date;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event() -> Event {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        Event {
            id: Uuid::nil(),
            user_id: "organizer".to_string(),
            title: "Flohmarkt".to_string(),
            description: String::new(),
            location: Some("Turnhalle".to_string()),
            event_date: at,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_absent_location_is_kept() {
        let patch: EventPatch = serde_json::from_str(r#"{"title":"Basar"}"#).unwrap();
        assert_eq!(patch.location, None);

        let mut event = event();
        event.apply(patch, Utc::now());
        assert_eq!(event.title, "Basar");
        assert_eq!(event.location.as_deref(), Some("Turnhalle"));
    }

    #[test]
    fn test_null_location_clears_it() {
        let patch: EventPatch = serde_json::from_str(r#"{"location":null}"#).unwrap();
        assert_eq!(patch.location, Some(None));

        let mut event = event();
        event.apply(patch, Utc::now());
        assert_eq!(event.location, None);
    }
}
