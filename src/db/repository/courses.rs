use sqlx::{sqlite::SqliteRow, Row};

use super::{now_timestamp, present, Repository};
use crate::errors::AppError;
use crate::models::{Course, UpdateCourseRequest};

const COURSE_COLUMNS: &str =
    "id, school_id, name, grade, period_number, teacher, room, student_id, created_at, updated_at";

/// A course ready to insert.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub school_id: String,
    pub name: String,
    pub grade: String,
    pub period_number: i32,
    pub teacher: String,
    pub room: String,
    pub student_id: Option<String>,
}

impl Repository {
    /// Courses owned by one student, by period.
    pub async fn list_courses_for_student(&self, student_id: &str) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM courses WHERE student_id = ? ORDER BY period_number, created_at",
            COURSE_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    /// Courses of a school, optionally narrowed to one grade, by period.
    pub async fn list_courses_for_school(
        &self,
        school_id: &str,
        grade: Option<&str>,
    ) -> Result<Vec<Course>, AppError> {
        let rows = match grade {
            Some(grade) => {
                sqlx::query(&format!(
                    "SELECT {} FROM courses WHERE school_id = ? AND grade = ? ORDER BY period_number, created_at",
                    COURSE_COLUMNS
                ))
                .bind(school_id)
                .bind(grade)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM courses WHERE school_id = ? ORDER BY period_number, created_at",
                    COURSE_COLUMNS
                ))
                .bind(school_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(course_from_row).collect()
    }

    /// Get a course by ID.
    pub async fn get_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM courses WHERE id = ?",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(course_from_row).transpose()
    }

    /// Create a new course.
    pub async fn create_course(&self, course: &NewCourse) -> Result<Course, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            "INSERT INTO courses (id, school_id, name, grade, period_number, teacher, room, student_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&course.school_id)
        .bind(&course.name)
        .bind(&course.grade)
        .bind(course.period_number)
        .bind(&course.teacher)
        .bind(&course.room)
        .bind(&course.student_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Course {
            id,
            school: course.school_id.clone(),
            name: course.name.clone(),
            grade: course.grade.clone(),
            period_number: course.period_number,
            teacher: course.teacher.clone(),
            room: course.room.clone(),
            student: course.student_id.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a partial update.
    ///
    /// Empty `name` and zero `period_number` are ignored; `teacher` and `room`
    /// take any supplied value, including an empty string.
    pub async fn update_course(
        &self,
        existing: Course,
        request: &UpdateCourseRequest,
    ) -> Result<Course, AppError> {
        let now = now_timestamp();
        let name = present(&request.name)
            .map(|s| s.trim().to_string())
            .unwrap_or(existing.name);
        let period_number = request
            .period_number
            .filter(|n| *n != 0)
            .unwrap_or(existing.period_number);
        let teacher = request.teacher.clone().unwrap_or(existing.teacher);
        let room = request.room.clone().unwrap_or(existing.room);

        sqlx::query(
            "UPDATE courses SET name = ?, period_number = ?, teacher = ?, room = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(period_number)
        .bind(&teacher)
        .bind(&room)
        .bind(&now)
        .bind(&existing.id)
        .execute(&self.pool)
        .await?;

        Ok(Course {
            id: existing.id,
            school: existing.school,
            name,
            grade: existing.grade,
            period_number,
            teacher,
            room,
            student: existing.student,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a course.
    pub async fn delete_course(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Course {} not found", id)));
        }
        Ok(())
    }
}

fn course_from_row(row: &SqliteRow) -> Result<Course, AppError> {
    Ok(Course {
        id: row.try_get("id")?,
        school: row.try_get("school_id")?,
        name: row.try_get("name")?,
        grade: row.try_get("grade")?,
        period_number: row.try_get("period_number")?,
        teacher: row.try_get("teacher")?,
        room: row.try_get("room")?,
        student: row.try_get("student_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
