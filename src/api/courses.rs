//! Course API endpoints.
//!
//! Students work on their own courses; staff and admins on their school's.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use super::{created, removed, success, ApiResult, Removed};
use crate::auth::CurrentUser;
use crate::db::NewCourse;
use crate::errors::AppError;
use crate::models::{Course, CourseQuery, CreateCourseRequest, Role, UpdateCourseRequest};
use crate::AppState;

/// GET /api/courses - List the caller's courses.
pub async fn list_courses(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<CourseQuery>,
) -> ApiResult<Vec<Course>> {
    let courses = match user.role {
        Role::Student => state.repo.list_courses_for_student(&user.id).await?,
        Role::Admin | Role::Staff => {
            let grade = query.grade.as_deref().filter(|g| !g.is_empty());
            state
                .repo
                .list_courses_for_school(user.school_id()?, grade)
                .await?
        }
    };
    success(courses)
}

/// POST /api/courses - Create a course in the caller's school.
pub async fn create_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateCourseRequest>,
) -> ApiResult<Course> {
    let school_id = user.school_id()?.to_string();

    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Course name is required".to_string()));
    }
    if request.period_number < 1 {
        return Err(AppError::Validation(
            "Period number must be positive".to_string(),
        ));
    }

    let grade = request
        .grade
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .or_else(|| match user.role {
            Role::Student => user.grade.clone(),
            Role::Admin | Role::Staff => None,
        })
        .ok_or_else(|| AppError::Validation("Grade is required".to_string()))?;

    let course = state
        .repo
        .create_course(&NewCourse {
            school_id,
            name: request.name.trim().to_string(),
            grade,
            period_number: request.period_number,
            teacher: request.teacher.unwrap_or_default(),
            room: request.room.unwrap_or_default(),
            student_id: match user.role {
                Role::Student => Some(user.id.clone()),
                Role::Admin | Role::Staff => None,
            },
        })
        .await?;

    created(course)
}

/// PUT /api/courses/:id - Update a course.
pub async fn update_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCourseRequest>,
) -> ApiResult<Course> {
    let course = find_course(&state, &id).await?;
    ensure_can_modify(&user, &course, "update this course")?;

    if request.period_number.is_some_and(|n| n < 0) {
        return Err(AppError::Validation(
            "Period number must be positive".to_string(),
        ));
    }

    success(state.repo.update_course(course, &request).await?)
}

/// DELETE /api/courses/:id - Delete a course.
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Removed> {
    let course = find_course(&state, &id).await?;
    ensure_can_modify(&user, &course, "delete this course")?;

    state.repo.delete_course(&course.id).await?;
    removed("Course")
}

async fn find_course(state: &AppState, id: &str) -> Result<Course, AppError> {
    state
        .repo
        .get_course(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}

fn ensure_can_modify(user: &CurrentUser, course: &Course, action: &str) -> Result<(), AppError> {
    match user.role {
        Role::Student if course.student.as_deref() == Some(user.id.as_str()) => Ok(()),
        Role::Student => Err(AppError::Forbidden(format!("Not authorized to {}", action))),
        Role::Admin | Role::Staff => user.ensure_same_school(&course.school, action),
    }
}
