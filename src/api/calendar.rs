//! Calendar event API endpoints.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};

use super::{created, removed, success, ApiResult, Removed};
use crate::auth::CurrentUser;
use crate::db::NewEvent;
use crate::errors::AppError;
use crate::models::datetime::{is_date_only, parse_timestamp};
use crate::models::{CalendarEvent, CreateEventRequest, EventQuery, UpdateEventRequest};
use crate::AppState;

/// GET /api/calendar - List the school's events, optionally by start date range.
pub async fn list_events(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<EventQuery>,
) -> ApiResult<Vec<CalendarEvent>> {
    let range = event_range(&query)?;
    success(state.repo.list_events(user.school_id()?, range).await?)
}

/// POST /api/calendar - Create an event (staff only).
pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateEventRequest>,
) -> ApiResult<CalendarEvent> {
    user.require_staff()?;
    let school_id = user.school_id()?.to_string();

    if request.event_name.trim().is_empty() {
        return Err(AppError::Validation("Event name is required".to_string()));
    }
    if request.end_date_time < request.start_date_time {
        return Err(AppError::Validation(
            "Event cannot end before it starts".to_string(),
        ));
    }

    let event = state
        .repo
        .create_event(&NewEvent {
            school_id,
            event_name: request.event_name.trim().to_string(),
            start_date_time: request.start_date_time,
            end_date_time: request.end_date_time,
            additional_details: request.additional_details.unwrap_or_default(),
            created_by: user.id.clone(),
        })
        .await?;

    created(event)
}

/// PUT /api/calendar/:id - Update an event (staff only, same school).
pub async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> ApiResult<CalendarEvent> {
    user.require_staff()?;
    let event = find_event(&state, &id).await?;
    user.ensure_same_school(&event.school, "update this event")?;

    success(state.repo.update_event(event, &request).await?)
}

/// DELETE /api/calendar/:id - Delete an event (staff only, same school).
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Removed> {
    user.require_staff()?;
    let event = find_event(&state, &id).await?;
    user.ensure_same_school(&event.school, "delete this event")?;

    state.repo.delete_event(&event.id).await?;
    removed("Event")
}

async fn find_event(state: &AppState, id: &str) -> Result<CalendarEvent, AppError> {
    state
        .repo
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

/// The filter applies only when both bounds are given. A bare `endDate` day
/// includes everything starting on that day.
fn event_range(query: &EventQuery) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, AppError> {
    let (Some(start), Some(end)) = (
        query.start_date.as_deref().filter(|s| !s.is_empty()),
        query.end_date.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Ok(None);
    };

    let from = parse_timestamp(start)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid startDate: {}", start)))?;
    let mut to = parse_timestamp(end)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid endDate: {}", end)))?;
    if is_date_only(end) {
        to = to + Duration::days(1) - Duration::milliseconds(1);
    }

    Ok(Some((from, to)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start: Option<&str>, end: Option<&str>) -> EventQuery {
        EventQuery {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
        }
    }

    #[test]
    fn test_range_needs_both_bounds() {
        assert!(event_range(&query(Some("2024-01-15"), None))
            .unwrap()
            .is_none());
        assert!(event_range(&query(None, None)).unwrap().is_none());
    }

    #[test]
    fn test_same_day_range_covers_whole_day() {
        let (from, to) = event_range(&query(Some("2024-01-15"), Some("2024-01-15")))
            .unwrap()
            .unwrap();
        assert_eq!(from.to_rfc3339(), "2024-01-15T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2024-01-15T23:59:59.999+00:00");
    }

    #[test]
    fn test_explicit_end_instant_is_kept() {
        let (_, to) = event_range(&query(Some("2024-01-15"), Some("2024-01-15T12:00:00Z")))
            .unwrap()
            .unwrap();
        assert_eq!(to.to_rfc3339(), "2024-01-15T12:00:00+00:00");
    }

    #[test]
    fn test_bad_bound_is_rejected() {
        assert!(matches!(
            event_range(&query(Some("soon"), Some("2024-01-15"))),
            Err(AppError::BadRequest(_))
        ));
    }
}
