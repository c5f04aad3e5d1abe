//! Bell schedule model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::datetime::deserialize_dates;

/// Whether a schedule recurs weekly or applies on listed dates only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScheduleType {
    Standard,
    Override,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Standard => "Standard",
            ScheduleType::Override => "Override",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Standard" => Some(ScheduleType::Standard),
            "Override" => Some(ScheduleType::Override),
            _ => None,
        }
    }
}

/// Day of the week, serialized by its full English name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// What happens during a slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SlotKind {
    Period,
    Break,
    Lunch,
    #[serde(rename = "Student Support")]
    StudentSupport,
    Advisory,
    Passing,
}

/// One block of time within a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    #[serde(rename = "type")]
    pub kind: SlotKind,
    /// Present only for `Period` slots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_number: Option<i32>,
}

/// Slot as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub kind: SlotKind,
    #[serde(default)]
    pub period_number: Option<i32>,
}

/// A bell schedule for a set of grades.
///
/// Standard schedules carry `days` and never `dates`; Override schedules the
/// reverse. The write path enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BellSchedule {
    pub id: String,
    pub school: String,
    pub schedule_type: ScheduleType,
    pub days: Vec<Weekday>,
    pub dates: Vec<NaiveDate>,
    pub grades: Vec<String>,
    pub slots: Vec<Slot>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a bell schedule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBellScheduleRequest {
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub days: Option<Vec<Weekday>>,
    #[serde(default, deserialize_with = "deserialize_dates")]
    pub dates: Option<Vec<NaiveDate>>,
    #[serde(default)]
    pub grades: Vec<String>,
    #[serde(default)]
    pub slots: Vec<SlotRequest>,
}

/// Request body for updating a bell schedule. Supplied lists replace the stored ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBellScheduleRequest {
    #[serde(default)]
    pub schedule_type: Option<ScheduleType>,
    #[serde(default)]
    pub days: Option<Vec<Weekday>>,
    #[serde(default, deserialize_with = "deserialize_dates")]
    pub dates: Option<Vec<NaiveDate>>,
    #[serde(default)]
    pub grades: Option<Vec<String>>,
    #[serde(default)]
    pub slots: Option<Vec<SlotRequest>>,
}

/// Query parameters for `GET /api/bell-schedules`.
#[derive(Debug, Clone, Deserialize)]
pub struct BellScheduleQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}
