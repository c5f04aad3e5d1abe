use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use super::{
    format_timestamp, now_timestamp, parse_stored_timestamp, present, stored_instant, Repository,
};
use crate::errors::AppError;
use crate::models::{CalendarEvent, UpdateEventRequest};

const EVENT_COLUMNS: &str = "id, school_id, event_name, start_date_time, end_date_time, additional_details, created_by, created_at, updated_at";

/// An event ready to insert.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub school_id: String,
    pub event_name: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub additional_details: String,
    pub created_by: String,
}

impl Repository {
    /// Events of a school by start time, optionally only those starting within `range` (inclusive).
    pub async fn list_events(
        &self,
        school_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let rows = match range {
            Some((from, to)) => {
                sqlx::query(&format!(
                    "SELECT {} FROM calendar_events WHERE school_id = ? AND start_date_time >= ? AND start_date_time <= ? ORDER BY start_date_time",
                    EVENT_COLUMNS
                ))
                .bind(school_id)
                .bind(format_timestamp(&from))
                .bind(format_timestamp(&to))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM calendar_events WHERE school_id = ? ORDER BY start_date_time",
                    EVENT_COLUMNS
                ))
                .bind(school_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(event_from_row).collect()
    }

    /// Get an event by ID.
    pub async fn get_event(&self, id: &str) -> Result<Option<CalendarEvent>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM calendar_events WHERE id = ?",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(event_from_row).transpose()
    }

    /// Create a new event.
    pub async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();
        let start_date_time = stored_instant(event.start_date_time);
        let end_date_time = stored_instant(event.end_date_time);

        sqlx::query(
            "INSERT INTO calendar_events (id, school_id, event_name, start_date_time, end_date_time, additional_details, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&event.school_id)
        .bind(&event.event_name)
        .bind(format_timestamp(&start_date_time))
        .bind(format_timestamp(&end_date_time))
        .bind(&event.additional_details)
        .bind(&event.created_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(CalendarEvent {
            id,
            school: event.school_id.clone(),
            event_name: event.event_name.clone(),
            start_date_time,
            end_date_time,
            additional_details: event.additional_details.clone(),
            created_by: event.created_by.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a partial update. `additional_details` accepts an empty string.
    pub async fn update_event(
        &self,
        existing: CalendarEvent,
        request: &UpdateEventRequest,
    ) -> Result<CalendarEvent, AppError> {
        let event_name = present(&request.event_name)
            .map(|s| s.trim().to_string())
            .unwrap_or(existing.event_name);
        let start_date_time =
            stored_instant(request.start_date_time.unwrap_or(existing.start_date_time));
        let end_date_time =
            stored_instant(request.end_date_time.unwrap_or(existing.end_date_time));
        let additional_details = request
            .additional_details
            .clone()
            .unwrap_or(existing.additional_details);

        if end_date_time < start_date_time {
            return Err(AppError::Validation(
                "Event cannot end before it starts".to_string(),
            ));
        }

        let now = now_timestamp();
        sqlx::query(
            "UPDATE calendar_events SET event_name = ?, start_date_time = ?, end_date_time = ?, additional_details = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&event_name)
        .bind(format_timestamp(&start_date_time))
        .bind(format_timestamp(&end_date_time))
        .bind(&additional_details)
        .bind(&now)
        .bind(&existing.id)
        .execute(&self.pool)
        .await?;

        Ok(CalendarEvent {
            id: existing.id,
            school: existing.school,
            event_name,
            start_date_time,
            end_date_time,
            additional_details,
            created_by: existing.created_by,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete an event.
    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", id)));
        }
        Ok(())
    }
}

fn event_from_row(row: &SqliteRow) -> Result<CalendarEvent, AppError> {
    let start: String = row.try_get("start_date_time")?;
    let end: String = row.try_get("end_date_time")?;

    Ok(CalendarEvent {
        id: row.try_get("id")?,
        school: row.try_get("school_id")?,
        event_name: row.try_get("event_name")?,
        start_date_time: parse_stored_timestamp(&start)?,
        end_date_time: parse_stored_timestamp(&end)?,
        additional_details: row.try_get("additional_details")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
