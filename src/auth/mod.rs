//! Bearer-token authentication and role checks.
//!
//! The middleware resolves the token to a stored user and attaches a
//! [`CurrentUser`] to the request. Handlers enforce roles themselves.

mod password;
mod token;

pub use password::{hash_password, verify_password, Argon2Params};
pub use token::{create_session_token, verify_session_token};

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::models::{Role, UserRecord};
use crate::AppState;

/// The authenticated caller, as loaded by [`require_user`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub school_id: Option<String>,
    pub grade: Option<String>,
}

impl From<UserRecord> for CurrentUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            role: record.role,
            school_id: record.school_id,
            grade: record.grade,
        }
    }
}

impl CurrentUser {
    /// Staff or admin.
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not authorized as staff".to_string()))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not authorized as an admin".to_string()))
        }
    }

    /// The caller's school, for school-scoped operations.
    pub fn school_id(&self) -> Result<&str, AppError> {
        self.school_id.as_deref().ok_or_else(|| {
            AppError::Forbidden("No school is associated with this account".to_string())
        })
    }

    /// Reject access to a record belonging to another school.
    pub fn ensure_same_school(&self, record_school: &str, action: &str) -> Result<(), AppError> {
        if self.school_id()? == record_school {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.id,
                email = %self.email,
                "Cross-school attempt to {}",
                action
            );
            Err(AppError::Forbidden(format!("Not authorized to {}", action)))
        }
    }
}

/// Authentication middleware. Requires `Authorization: Bearer <token>`.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

    let claims = verify_session_token(token, &state.config)?;

    let user = state
        .repo
        .get_user_record(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authorized, user not found".to_string()))?;

    request.extensions_mut().insert(CurrentUser::from(user));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, school: Option<&str>) -> CurrentUser {
        CurrentUser {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            role,
            school_id: school.map(str::to_string),
            grade: None,
        }
    }

    #[test]
    fn test_staff_check() {
        assert!(user(Role::Admin, None).require_staff().is_ok());
        assert!(user(Role::Staff, Some("s1")).require_staff().is_ok());
        assert!(user(Role::Student, Some("s1")).require_staff().is_err());
    }

    #[test]
    fn test_admin_check() {
        assert!(user(Role::Admin, None).require_admin().is_ok());
        assert!(matches!(
            user(Role::Staff, Some("s1")).require_admin(),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_school_scope() {
        let staff = user(Role::Staff, Some("s1"));
        assert!(staff.ensure_same_school("s1", "update this event").is_ok());
        assert!(matches!(
            staff.ensure_same_school("s2", "update this event"),
            Err(AppError::Forbidden(_))
        ));

        // Admins without a school cannot act on school records.
        assert!(user(Role::Admin, None)
            .ensure_same_school("s1", "delete this schedule")
            .is_err());
    }
}
