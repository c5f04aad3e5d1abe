//! Course model.

use serde::{Deserialize, Serialize};

/// A class a student attends during a numbered period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub school: String,
    pub name: String,
    pub grade: String,
    pub period_number: i32,
    pub teacher: String,
    pub room: String,
    /// Owning student, set when a student created the course
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new course.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub name: String,
    /// Defaults to the caller's grade for students
    #[serde(default)]
    pub grade: Option<String>,
    pub period_number: i32,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
}

/// Request body for updating an existing course.
///
/// `teacher` and `room` may be cleared with an empty string; empty `name` and
/// zero `periodNumber` are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub period_number: Option<i32>,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
}

/// Query parameters for `GET /api/courses`.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseQuery {
    #[serde(default)]
    pub grade: Option<String>,
}
