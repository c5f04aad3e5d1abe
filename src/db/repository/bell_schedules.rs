use sqlx::{sqlite::SqliteRow, Row};

use super::{from_json, now_timestamp, to_json, Repository};
use crate::errors::AppError;
use crate::models::{BellSchedule, ScheduleType};
use crate::schedule::ScheduleDraft;

const SCHEDULE_COLUMNS: &str =
    "id, school_id, schedule_type, days, dates, grades, slots, created_by, created_at, updated_at";

impl Repository {
    /// Schedules of a school, newest first, optionally only those covering `grade`.
    pub async fn list_bell_schedules(
        &self,
        school_id: &str,
        grade: Option<&str>,
    ) -> Result<Vec<BellSchedule>, AppError> {
        let rows = match grade {
            Some(grade) => {
                sqlx::query(&format!(
                    r#"SELECT {} FROM bell_schedules
                       WHERE school_id = ?
                         AND EXISTS (SELECT 1 FROM json_each(bell_schedules.grades) WHERE json_each.value = ?)
                       ORDER BY created_at DESC, rowid DESC"#,
                    SCHEDULE_COLUMNS
                ))
                .bind(school_id)
                .bind(grade)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM bell_schedules WHERE school_id = ? ORDER BY created_at DESC, rowid DESC",
                    SCHEDULE_COLUMNS
                ))
                .bind(school_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(schedule_from_row).collect()
    }

    /// Get a schedule by ID.
    pub async fn get_bell_schedule(&self, id: &str) -> Result<Option<BellSchedule>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM bell_schedules WHERE id = ?",
            SCHEDULE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(schedule_from_row).transpose()
    }

    /// Create a schedule from validated contents.
    pub async fn create_bell_schedule(
        &self,
        school_id: &str,
        created_by: &str,
        draft: ScheduleDraft,
    ) -> Result<BellSchedule, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            "INSERT INTO bell_schedules (id, school_id, schedule_type, days, dates, grades, slots, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(school_id)
        .bind(draft.schedule_type.as_str())
        .bind(to_json(&draft.days)?)
        .bind(to_json(&draft.dates)?)
        .bind(to_json(&draft.grades)?)
        .bind(to_json(&draft.slots)?)
        .bind(created_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(BellSchedule {
            id,
            school: school_id.to_string(),
            schedule_type: draft.schedule_type,
            days: draft.days,
            dates: draft.dates,
            grades: draft.grades,
            slots: draft.slots,
            created_by: created_by.to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Replace a schedule's contents with a validated draft.
    pub async fn update_bell_schedule(
        &self,
        existing: BellSchedule,
        draft: ScheduleDraft,
    ) -> Result<BellSchedule, AppError> {
        let now = now_timestamp();

        sqlx::query(
            "UPDATE bell_schedules SET schedule_type = ?, days = ?, dates = ?, grades = ?, slots = ?, updated_at = ? WHERE id = ?",
        )
        .bind(draft.schedule_type.as_str())
        .bind(to_json(&draft.days)?)
        .bind(to_json(&draft.dates)?)
        .bind(to_json(&draft.grades)?)
        .bind(to_json(&draft.slots)?)
        .bind(&now)
        .bind(&existing.id)
        .execute(&self.pool)
        .await?;

        Ok(BellSchedule {
            id: existing.id,
            school: existing.school,
            schedule_type: draft.schedule_type,
            days: draft.days,
            dates: draft.dates,
            grades: draft.grades,
            slots: draft.slots,
            created_by: existing.created_by,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a schedule.
    pub async fn delete_bell_schedule(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM bell_schedules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Schedule {} not found", id)));
        }
        Ok(())
    }
}

fn schedule_from_row(row: &SqliteRow) -> Result<BellSchedule, AppError> {
    let schedule_type: String = row.try_get("schedule_type")?;
    let days: String = row.try_get("days")?;
    let dates: String = row.try_get("dates")?;
    let grades: String = row.try_get("grades")?;
    let slots: String = row.try_get("slots")?;

    Ok(BellSchedule {
        id: row.try_get("id")?,
        school: row.try_get("school_id")?,
        schedule_type: ScheduleType::parse(&schedule_type).ok_or_else(|| {
            AppError::Database(format!("Unknown schedule type '{}'", schedule_type))
        })?,
        days: from_json(&days)?,
        dates: from_json(&dates)?,
        grades: from_json(&grades)?,
        slots: from_json(&slots)?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
