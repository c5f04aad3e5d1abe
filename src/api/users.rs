//! User API endpoints. All admin only.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::{created, removed, success, ApiResult, Removed};
use crate::auth::{hash_password, CurrentUser};
use crate::db::{NewUser, UserChanges};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, Role, UpdateUserRequest, User};
use crate::AppState;

/// GET /api/users - List all users.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<User>> {
    user.require_admin()?;
    success(state.repo.list_users().await?)
}

/// GET /api/users/:id - Get a single user.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    user.require_admin()?;

    match state.repo.get_user(&id).await? {
        Some(found) => success(found),
        None => Err(AppError::NotFound("User not found".to_string())),
    }
}

/// POST /api/users - Register a user.
///
/// Admins never belong to a school; only students keep a grade.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    user.require_admin()?;

    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if state.repo.get_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    let school_id = match request.role {
        Role::Admin => None,
        Role::Staff | Role::Student => {
            let school_id = request
                .school
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Validation("Staff and students need a school".to_string())
                })?;
            if state.repo.get_school(&school_id).await?.is_none() {
                return Err(AppError::NotFound(format!("School {} not found", school_id)));
            }
            Some(school_id)
        }
    };

    let grade = match request.role {
        Role::Student => Some(
            request
                .grade
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .ok_or_else(|| AppError::Validation("Students need a grade".to_string()))?,
        ),
        Role::Admin | Role::Staff => None,
    };

    let password_hash = hash_password(request.password, state.config.argon2).await?;
    let record = state
        .repo
        .create_user(&NewUser {
            email: request.email,
            password_hash,
            name: request.name,
            role: request.role,
            school_id,
            grade,
        })
        .await?;

    tracing::info!(user_id = %record.id, role = record.role.as_str(), "Registered user");
    created(state.repo.with_school(record).await?)
}

/// PUT /api/users/:id - Update name, email, password or grade.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    user.require_admin()?;

    let existing = state
        .repo
        .get_user_record(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let email = request.email.filter(|e| !e.trim().is_empty());
    if let Some(email) = &email {
        if !email.contains('@') {
            return Err(AppError::Validation("A valid email is required".to_string()));
        }
        if let Some(other) = state.repo.get_user_by_email(email).await? {
            if other.id != existing.id {
                return Err(AppError::BadRequest("User already exists".to_string()));
            }
        }
    }

    let password_hash = match request.password.filter(|p| !p.is_empty()) {
        Some(password) => Some(hash_password(password, state.config.argon2).await?),
        None => None,
    };

    let grade = match existing.role {
        Role::Student => request.grade.filter(|g| !g.trim().is_empty()),
        Role::Admin | Role::Staff => None,
    };

    let changes = UserChanges {
        email,
        password_hash,
        name: request.name.filter(|n| !n.trim().is_empty()),
        grade,
    };

    let record = state.repo.update_user(existing, changes).await?;
    success(state.repo.with_school(record).await?)
}

/// DELETE /api/users/:id - Delete a user.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Removed> {
    user.require_admin()?;

    if user.id == id {
        return Err(AppError::BadRequest(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    state.repo.delete_user(&id).await?;
    removed("User")
}
