//! Timestamp and calendar helpers shared across the engine.
//!
//! Two kinds of temporal values flow through the planner:
//!
//! - **Timestamps** (`createdAt`, `updatedAt`, `backupDate`, `exportDate`):
//!   RFC 3339 strings minted in UTC.
//! - **Calendar dates** (`dueDate`): `YYYY-MM-DD` strings with day
//!   granularity, always interpreted in the host's local calendar.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// Wire format for due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Current instant as an RFC 3339 UTC string.
#[must_use]
pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/// Current epoch milliseconds.
#[must_use]
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Today's date in the host's local calendar.
#[must_use]
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an RFC 3339 timestamp into the host's local wall-clock time.
///
/// Returns `None` for anything that does not parse; callers decide how to
/// fall back (weekly stats fall back from `updatedAt` to `createdAt`).
#[must_use]
pub fn parse_timestamp_local(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

/// Parse a `YYYY-MM-DD` due date. Returns `None` for malformed or
/// non-existent dates (e.g. `2025-02-30`).
#[must_use]
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DUE_DATE_FORMAT).ok()
}

/// Render a date in the wire `YYYY-MM-DD` format.
#[must_use]
pub fn format_due_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_iso_parses_back() {
        let stamp = now_iso();
        assert!(parse_timestamp_local(&stamp).is_some());
    }

    #[test]
    fn due_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(format_due_date(date), "2025-03-14");
        assert_eq!(parse_due_date("2025-03-14"), Some(date));
    }

    #[test]
    fn nonexistent_date_rejected() {
        assert_eq!(parse_due_date("2025-02-30"), None);
    }

    #[test]
    fn malformed_inputs_rejected() {
        assert_eq!(parse_due_date("03/14/2025"), None);
        assert_eq!(parse_due_date(""), None);
        assert_eq!(parse_timestamp_local("not a timestamp"), None);
        assert_eq!(parse_timestamp_local("2025-03-14"), None);
    }

    #[test]
    fn timestamp_with_offset_parses() {
        assert!(parse_timestamp_local("2025-03-14T09:30:00+02:00").is_some());
        assert!(parse_timestamp_local("2025-03-14T09:30:00Z").is_some());
    }
}
