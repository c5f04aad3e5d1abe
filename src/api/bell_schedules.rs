//! Bell schedule API endpoints.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};

use super::{created, removed, success, ApiResult, Removed};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::datetime::parse_calendar_date;
use crate::models::{
    BellSchedule, BellScheduleQuery, CreateBellScheduleRequest, UpdateBellScheduleRequest,
};
use crate::schedule::{build_slots, resolve_schedule, ScheduleDraft};
use crate::AppState;

/// GET /api/bell-schedules - List schedules, or resolve the one for `date`.
///
/// With `date`, the body's `data` is a single schedule or `null`.
pub async fn list_bell_schedules(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<BellScheduleQuery>,
) -> Result<Response, AppError> {
    let grade = query.grade.as_deref().filter(|g| !g.is_empty());
    let schedules = state
        .repo
        .list_bell_schedules(user.school_id()?, grade)
        .await?;

    match query.date.as_deref().filter(|d| !d.is_empty()) {
        Some(raw) => {
            let date = parse_calendar_date(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", raw)))?;
            let picked = resolve_schedule(&schedules, date).cloned();
            tracing::debug!(
                %date,
                grade = grade.unwrap_or("*"),
                found = picked.is_some(),
                "Resolved bell schedule"
            );
            Ok(success(picked)?.into_response())
        }
        None => Ok(success(schedules)?.into_response()),
    }
}

/// POST /api/bell-schedules - Create a schedule (staff only).
pub async fn create_bell_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateBellScheduleRequest>,
) -> ApiResult<BellSchedule> {
    user.require_staff()?;
    let school_id = user.school_id()?.to_string();

    let draft = ScheduleDraft::new(
        request.schedule_type,
        request.days,
        request.dates,
        request.grades,
        build_slots(request.slots)?,
    )?;

    created(
        state
            .repo
            .create_bell_schedule(&school_id, &user.id, draft)
            .await?,
    )
}

/// PUT /api/bell-schedules/:id - Update a schedule (staff only, same school).
pub async fn update_bell_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBellScheduleRequest>,
) -> ApiResult<BellSchedule> {
    user.require_staff()?;
    let existing = find_schedule(&state, &id).await?;
    user.ensure_same_school(&existing.school, "update this schedule")?;

    let slots = match request.slots {
        Some(slots) => build_slots(slots)?,
        None => existing.slots.clone(),
    };
    let draft = ScheduleDraft::new(
        request.schedule_type.unwrap_or(existing.schedule_type),
        request.days.or_else(|| Some(existing.days.clone())),
        request.dates.or_else(|| Some(existing.dates.clone())),
        request.grades.unwrap_or_else(|| existing.grades.clone()),
        slots,
    )?;

    success(state.repo.update_bell_schedule(existing, draft).await?)
}

/// DELETE /api/bell-schedules/:id - Delete a schedule (staff only, same school).
pub async fn delete_bell_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Removed> {
    user.require_staff()?;
    let existing = find_schedule(&state, &id).await?;
    user.ensure_same_school(&existing.school, "delete this schedule")?;

    state.repo.delete_bell_schedule(&existing.id).await?;
    removed("Schedule")
}

async fn find_schedule(state: &AppState, id: &str) -> Result<BellSchedule, AppError> {
    state
        .repo
        .get_bell_schedule(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))
}
