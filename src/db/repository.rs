//! Database repository for CRUD operations.
//!
//! One `impl Repository` block per record type lives in the submodules.
//! List-valued fields are stored as JSON text columns.

mod bell_schedules;
mod courses;
mod events;
mod schools;
mod users;

pub use courses::NewCourse;
pub use events::NewEvent;
pub use users::{NewUser, UserChanges};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;

use crate::errors::AppError;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Current time as a fixed-width RFC 3339 string, so text order is time order.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fixed-width storage form of an event timestamp, to the millisecond.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// An instant at the precision it is stored with.
fn stored_instant(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(3)
}

fn parse_stored_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("Corrupt timestamp '{}': {}", raw, e)))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(value)?)
}

fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, AppError> {
    Ok(serde_json::from_str(raw)?)
}

/// Whether an incoming update string carries a value. Empty strings are ignored.
fn present(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_sort_lexically() {
        let early: DateTime<Utc> = "2024-01-15T09:00:00Z".parse().unwrap();
        let late: DateTime<Utc> = "2024-01-15T10:30:00.250Z".parse().unwrap();
        assert!(format_timestamp(&early) < format_timestamp(&late));
        assert_eq!(format_timestamp(&early), "2024-01-15T09:00:00.000Z");
        assert_eq!(format_timestamp(&late), "2024-01-15T10:30:00.250Z");
        assert_eq!(now_timestamp().len(), "2024-01-15T10:30:00.250Z".len());
    }

    #[test]
    fn test_stored_instant_keeps_milliseconds() {
        let precise: DateTime<Utc> = "2024-01-15T09:00:00.750123Z".parse().unwrap();
        let stored = stored_instant(precise);
        assert_eq!(format_timestamp(&stored), "2024-01-15T09:00:00.750Z");
        assert_eq!(parse_stored_timestamp(&format_timestamp(&stored)).unwrap(), stored);
    }

    #[test]
    fn test_present_ignores_empty_strings() {
        assert!(present(&None).is_none());
        assert!(present(&Some(String::new())).is_none());
        assert!(present(&Some("  ".to_string())).is_none());
        assert_eq!(present(&Some("Room 4".to_string())).unwrap(), "Room 4");
    }
}
