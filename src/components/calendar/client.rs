use super::models::{CalendarEvent, EventList};
use crate::auth::Credentials;
use crate::error::{check_status, payload_error, SyncResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use tracing::debug;

/// Base URL for Google Calendar API v3
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Source of calendar events for a time window
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events starting in `[time_min, time_max)`, recurring events expanded
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> SyncResult<Vec<CalendarEvent>>;
}

/// Google Calendar API client
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(client: Client, credentials: &Credentials) -> Self {
        Self {
            client,
            access_token: credentials.access_token().to_string(),
            base_url: CALENDAR_API_BASE.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn list_events_page(
        &self,
        calendar_id: &str,
        time_min: &str,
        time_max: &str,
        page_token: Option<&str>,
    ) -> SyncResult<EventList> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );

        let mut request = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min),
                ("timeMax", time_max),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = check_status("Google Calendar", request.send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| payload_error(&format!("Failed to parse events response: {}", e)))
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> SyncResult<Vec<CalendarEvent>> {
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = time_max.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_events_page(calendar_id, &time_min, &time_max, page_token.as_deref())
                .await?;
            events.extend(page.items);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Fetched {} events from calendar {}", events.len(), calendar_id);
        Ok(events)
    }
}
