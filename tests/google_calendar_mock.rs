use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use goodash_sync::components::calendar::{sync_calendar, CalendarEvent, CalendarSource};
use goodash_sync::config::CalendarConfig;
use goodash_sync::error::{other_error, SyncResult};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;

/// Mock calendar that returns canned events and records the requested window
#[derive(Default)]
struct MockCalendarSource {
    events: Vec<CalendarEvent>,
    fail: bool,
    requests: Mutex<Vec<(String, DateTime<Utc>, DateTime<Utc>)>>,
}

impl MockCalendarSource {
    fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl CalendarSource for MockCalendarSource {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> SyncResult<Vec<CalendarEvent>> {
        self.requests
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), time_min, time_max));
        if self.fail {
            return Err(other_error("connection reset by peer"));
        }
        Ok(self.events.clone())
    }
}

fn settings(output: &Path) -> CalendarConfig {
    CalendarConfig {
        calendar_id: "family".to_string(),
        output: output.to_path_buf(),
        lookback_hours: 6,
        lookahead_hours: 36,
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap()
}

#[tokio::test]
async fn test_sync_writes_filtered_sorted_calendar() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("js").join("calendar.js");
    let source = MockCalendarSource::with_events(vec![
        CalendarEvent::timed("a", Some("A"), "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"),
        CalendarEvent::timed("n", None, "2024-01-01T08:30:00Z", "2024-01-01T09:30:00Z"),
        CalendarEvent::timed("b", Some("B"), "2024-01-01T08:00:00Z", "2024-01-01T09:00:00Z"),
    ]);

    let events = sync_calendar(&source, &settings(&output), &now())
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].summary, "B");
    assert_eq!(events[1].summary, "A");

    let expected = r#"var calendar = [
    {
        "start_dt": "2024-01-01T08:00:00Z",
        "summary": "B",
        "start": "8:00AM",
        "end": "9:00AM"
    },
    {
        "start_dt": "2024-01-01T09:00:00Z",
        "summary": "A",
        "start": "9:00AM",
        "end": "10:00AM"
    }
];"#;
    assert_eq!(fs::read_to_string(&output).unwrap(), expected);
}

#[tokio::test]
async fn test_sync_requests_window_around_now() {
    let dir = tempdir().unwrap();
    let source = MockCalendarSource::with_events(Vec::new());

    sync_calendar(&source, &settings(&dir.path().join("calendar.js")), &now())
        .await
        .unwrap();

    let requests = source.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (calendar_id, time_min, time_max) = &requests[0];
    assert_eq!(calendar_id, "family");
    assert_eq!(*time_min, Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap());
    assert_eq!(*time_max, Utc.with_ymd_and_hms(2024, 1, 2, 19, 0, 0).unwrap());
}

#[tokio::test]
async fn test_fetch_failure_leaves_previous_file_untouched() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("calendar.js");
    let previous = "var calendar = [\n    {\n        \"summary\": \"Old\"\n    }\n];";
    fs::write(&output, previous).unwrap();

    let result = sync_calendar(&MockCalendarSource::failing(), &settings(&output), &now()).await;

    assert!(result.is_err());
    assert_eq!(fs::read(&output).unwrap(), previous.as_bytes());
}

#[tokio::test]
async fn test_parse_failure_leaves_previous_file_untouched() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("calendar.js");
    fs::write(&output, "var calendar = [];").unwrap();

    let source = MockCalendarSource::with_events(vec![CalendarEvent::timed(
        "bad",
        Some("Bad"),
        "2024-01-01 nine-ish",
        "2024-01-01T10:00:00Z",
    )]);

    assert!(sync_calendar(&source, &settings(&output), &now()).await.is_err());
    assert_eq!(fs::read_to_string(&output).unwrap(), "var calendar = [];");
}

#[tokio::test]
async fn test_sync_with_local_reference_time() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("calendar.js");
    let now = Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let start = now.to_rfc3339();
    let end = (now + chrono::Duration::hours(1)).to_rfc3339();
    let source = MockCalendarSource::with_events(vec![CalendarEvent::timed(
        "l",
        Some("Lunch"),
        &start,
        &end,
    )]);

    let events = sync_calendar(&source, &settings(&output), &now).await.unwrap();

    assert_eq!(events[0].start, "12:00PM");
    assert_eq!(events[0].end, "1:00PM");
}
