//! Calendar sync: fetch a window of events, reshape them for the dashboard
//! and render `calendar.js`.

pub mod client;
pub mod models;
pub mod time;

pub use client::{CalendarSource, GoogleCalendarClient};
pub use models::{CalendarEvent, DisplayEvent};
pub use time::format_display_time;

use super::{SyncComponent, SyncContext};
use crate::config::CalendarConfig;
use crate::error::{payload_error, SyncResult};
use crate::utils::render::write_assignment;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use tracing::{debug, info};

/// Global variable name the front end reads
pub const CALENDAR_VAR: &str = "calendar";

/// Turn raw events into display events sorted by raw start timestamp.
///
/// Events without a summary are dropped. A titled event without a
/// `dateTime` start or end is a malformed payload.
pub fn normalize_events<Tz: TimeZone>(
    events: Vec<CalendarEvent>,
    reference_now: &DateTime<Tz>,
) -> SyncResult<Vec<DisplayEvent>> {
    let mut display = Vec::with_capacity(events.len());

    for event in events {
        let summary = match event.summary {
            Some(summary) if !summary.is_empty() => summary,
            _ => {
                debug!("Skipping event {} without summary", event.id);
                continue;
            }
        };

        let start_dt = event
            .start
            .date_time
            .ok_or_else(|| payload_error(&format!("Event {} has no start.dateTime", event.id)))?;
        let end_dt = event
            .end
            .date_time
            .ok_or_else(|| payload_error(&format!("Event {} has no end.dateTime", event.id)))?;

        display.push(DisplayEvent {
            start: format_display_time(&start_dt, true, reference_now)?,
            end: format_display_time(&end_dt, false, reference_now)?,
            start_dt,
            summary,
        });
    }

    display.sort_by(|a, b| a.start_dt.cmp(&b.start_dt));
    Ok(display)
}

/// Fetch, normalize and render the calendar file.
///
/// Nothing is written unless every step succeeds, so a failed run leaves the
/// previous file in place.
pub async fn sync_calendar<Tz: TimeZone>(
    source: &dyn CalendarSource,
    settings: &CalendarConfig,
    reference_now: &DateTime<Tz>,
) -> SyncResult<Vec<DisplayEvent>> {
    let (time_min, time_max) = time::fetch_window(
        reference_now,
        settings.lookback_hours,
        settings.lookahead_hours,
    );

    let events = source
        .list_events(&settings.calendar_id, time_min, time_max)
        .await?;
    info!("Found {} events...", events.len());

    let calendar = normalize_events(events, reference_now)?;
    write_assignment(&settings.output, CALENDAR_VAR, &calendar)?;

    info!(
        "Calendar sync complete, wrote {} events to {}",
        calendar.len(),
        settings.output.display()
    );
    Ok(calendar)
}

/// Calendar component backed by Google Calendar
#[derive(Debug, Default, Clone, Copy)]
pub struct CalendarSync;

#[async_trait]
impl SyncComponent for CalendarSync {
    fn name(&self) -> &'static str {
        "calendar"
    }

    async fn run(&self, ctx: &SyncContext) -> SyncResult<()> {
        let client = GoogleCalendarClient::new(ctx.client.clone(), &ctx.credentials);
        sync_calendar(&client, &ctx.config.calendar, &ctx.now).await?;
        Ok(())
    }
}
