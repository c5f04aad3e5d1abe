//! Lenient date and timestamp parsing for client input.
//!
//! Browsers send `datetime-local` values without an offset (`2024-01-15T09:30`)
//! and date pickers send bare days (`2024-01-15`). Both are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse an RFC 3339 timestamp, an offset-less local timestamp, or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Parse a calendar day. Timestamps are reduced to their UTC date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date_naive()))
}

/// Whether the input names a whole day rather than an instant.
pub fn is_date_only(raw: &str) -> bool {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").is_ok()
}

/// Serde adapter for required timestamps.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// Serde adapter for optional timestamps. Empty strings count as absent.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
    }
}

/// Serde adapter for a list of calendar days.
pub fn deserialize_dates<'de, D>(deserializer: D) -> Result<Option<Vec<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Vec<String>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    raw.iter()
        .map(|s| {
            parse_calendar_date(s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        let dt = parse_timestamp("2024-03-04T08:15:00+02:00").unwrap();
        assert_eq!(dt.hour(), 6);
    }

    #[test]
    fn test_parse_datetime_local() {
        let dt = parse_timestamp("2024-03-04T08:15").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-04T08:15:00+00:00");
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        let dt = parse_timestamp("2024-03-04").unwrap();
        assert_eq!(dt.hour(), 0);
        assert!(is_date_only("2024-03-04"));
        assert!(!is_date_only("2024-03-04T00:00"));
    }

    #[test]
    fn test_calendar_date_ignores_time_of_day() {
        assert_eq!(
            parse_calendar_date("2024-03-04T23:59:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 4)
        );
        assert_eq!(
            parse_calendar_date("2024-03-04"),
            NaiveDate::from_ymd_opt(2024, 3, 4)
        );
        assert!(parse_calendar_date("next tuesday").is_none());
    }
}
