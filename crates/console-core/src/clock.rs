//! Timestamp helpers shared by the panels.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};

/// Naive layouts the backend and manual timestamp entry produce
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time as ISO-8601 with millisecond precision
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render an ISO timestamp in local time.
/// Offset-less values are taken as local wall-clock time.
pub fn display_local(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.format(DISPLAY_FORMAT).to_string())
}

/// Like `display_local`, but echoes unparseable input back unchanged
pub fn display_or_raw(raw: &str) -> String {
    display_local(raw).unwrap_or_else(|| raw.to_string())
}
