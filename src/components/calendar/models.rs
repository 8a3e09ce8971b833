use serde::{Deserialize, Serialize};

/// Start or end of a Google Calendar event
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    /// RFC 3339 timestamp for timed events
    pub date_time: Option<String>,
    /// `YYYY-MM-DD` for all-day events
    pub date: Option<String>,
}

/// Calendar event as returned by the Google Calendar API
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
}

impl CalendarEvent {
    /// Timed event with the given summary, mostly useful for tests and mocks
    pub fn timed(id: &str, summary: Option<&str>, start: &str, end: &str) -> Self {
        Self {
            id: id.to_string(),
            summary: summary.map(str::to_string),
            start: EventTime {
                date_time: Some(start.to_string()),
                date: None,
            },
            end: EventTime {
                date_time: Some(end.to_string()),
                date: None,
            },
        }
    }
}

/// One page of `events.list`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    pub next_page_token: Option<String>,
}

/// Dashboard-ready event, serialized in this field order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayEvent {
    /// Raw start timestamp, only used for ordering
    pub start_dt: String,
    pub summary: String,
    pub start: String,
    pub end: String,
}
