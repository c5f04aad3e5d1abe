//! School API endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::{created, removed, success, ApiResult, Removed};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{CreateSchoolRequest, School, UpdateSchoolRequest};
use crate::AppState;

/// GET /api/schools - List all schools.
pub async fn list_schools(State(state): State<AppState>) -> ApiResult<Vec<School>> {
    success(state.repo.list_schools().await?)
}

/// GET /api/schools/:id - Get a single school.
pub async fn get_school(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<School> {
    match state.repo.get_school(&id).await? {
        Some(school) => success(school),
        None => Err(AppError::NotFound("School not found".to_string())),
    }
}

/// POST /api/schools - Register a school (admin only).
pub async fn create_school(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateSchoolRequest>,
) -> ApiResult<School> {
    user.require_admin()?;

    if request.name.trim().is_empty() {
        return Err(AppError::Validation("School name is required".to_string()));
    }
    if request.address.trim().is_empty() {
        return Err(AppError::Validation("Address is required".to_string()));
    }

    let school = state.repo.create_school(&request).await?;
    tracing::info!(school_id = %school.id, "Created school {}", school.name);
    created(school)
}

/// PUT /api/schools/:id - Update a school (admin only).
pub async fn update_school(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSchoolRequest>,
) -> ApiResult<School> {
    user.require_admin()?;

    let existing = state
        .repo
        .get_school(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("School not found".to_string()))?;

    success(state.repo.update_school(existing, &request).await?)
}

/// DELETE /api/schools/:id - Delete a school nothing references (admin only).
pub async fn delete_school(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Removed> {
    user.require_admin()?;

    if state.repo.get_school(&id).await?.is_none() {
        return Err(AppError::NotFound("School not found".to_string()));
    }

    let dependents = state.repo.count_school_dependents(&id).await?;
    if dependents > 0 {
        return Err(AppError::Conflict(format!(
            "School still has {} dependent records",
            dependents
        )));
    }

    state.repo.delete_school(&id).await?;
    removed("School")
}
