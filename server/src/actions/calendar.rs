//! iCalendar export of a single event.

use chrono::{DateTime, Duration, Utc};
use icalendar::{Calendar, Component};
use tracing::error;
use uuid::Uuid;

use crate::config::CalendarSettings;
use crate::models::Event;
use crate::state::AppState;
use crate::utils::AppError;

/// Every exported event is blocked for this long.
pub const EVENT_DURATION_HOURS: i64 = 2;

const ICS_DATETIME: &str = "%Y%m%dT%H%M%SZ";

#[derive(Debug, Clone)]
pub struct CalendarExport {
    pub event_id: Uuid,
    pub body: String,
}

impl CalendarExport {
    pub fn filename(&self) -> String {
        format!("event_{}.ics", self.event_id)
    }
}

fn generation_failed() -> AppError {
    AppError::Internal("Failed to generate calendar file".to_string())
}

pub fn render_event(
    event: &Event,
    settings: &CalendarSettings,
    stamp: DateTime<Utc>,
) -> Result<String, AppError> {
    let start = event.event_date;
    let end = start
        .checked_add_signed(Duration::hours(EVENT_DURATION_HOURS))
        .ok_or_else(|| {
            error!(event_id = %event.id, start = %start, "Calendar end time out of range");
            generation_failed()
        })?;

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@{}", event.id, settings.uid_domain));
    ics_event.summary(&event.title);
    if !event.description.is_empty() {
        ics_event.description(&event.description);
    }
    ics_event.add_property("LOCATION", &settings.location);
    ics_event.add_property("DTSTAMP", stamp.format(ICS_DATETIME).to_string());
    ics_event.add_property("DTSTART", start.format(ICS_DATETIME).to_string());
    ics_event.add_property("DTEND", end.format(ICS_DATETIME).to_string());

    let mut cal = Calendar::new();
    cal.push(ics_event.done());
    Ok(cal.done().to_string())
}

pub async fn export(state: &AppState, event_id: Uuid) -> Result<CalendarExport, AppError> {
    let event = state
        .store
        .find_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let body = render_event(&event, &state.calendar, Utc::now())?;
    Ok(CalendarExport { event_id, body })
}
