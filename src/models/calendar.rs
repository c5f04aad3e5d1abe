//! Calendar event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::datetime::{deserialize_optional_timestamp, deserialize_timestamp};

/// A dated school event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub school: String,
    pub event_name: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub additional_details: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub event_name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_date_time: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end_date_time: DateTime<Utc>,
    #[serde(default)]
    pub additional_details: Option<String>,
}

/// Request body for updating an existing event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub start_date_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub end_date_time: Option<DateTime<Utc>>,
    /// An empty string clears the details
    #[serde(default)]
    pub additional_details: Option<String>,
}

/// Query parameters for `GET /api/calendar`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}
