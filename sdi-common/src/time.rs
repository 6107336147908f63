//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// ISO 8601 timestamp used in audit log entries (`2024-03-01T09:30:00.000Z`)
pub fn audit_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar date used to name daily audit log files (`2024-03-01`)
pub fn log_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
