//! Login and profile endpoints.

use axum::{extract::State, Extension, Json};

use super::{success, ApiResult};
use crate::auth::{create_session_token, verify_password, CurrentUser};
use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse, User};
use crate::AppState;

/// POST /api/auth/login - Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let record = state
        .repo
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(request.password, record.password_hash.clone()).await? {
        tracing::info!("Failed login for {}", record.email);
        return Err(invalid());
    }

    let token = create_session_token(&record.id, &state.config)?;
    let user = state.repo.with_school(record).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    success(LoginResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        school: user.school,
        grade: user.grade,
        token,
    })
}

/// GET /api/auth/profile - The caller's own profile.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<User> {
    match state.repo.get_user(&user.id).await? {
        Some(profile) => success(profile),
        None => Err(AppError::NotFound("User not found".to_string())),
    }
}
