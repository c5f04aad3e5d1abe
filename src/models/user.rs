//! User model and login payloads.

use serde::{Deserialize, Serialize};

use super::School;

/// Account role. Ordered from most to least privileged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    /// Admins pass every staff check.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}

/// A user as stored, including the password hash. Never serialized.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub school_id: Option<String>,
    pub grade: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A user as returned by the API, with the school embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub school: Option<School>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn from_record(record: UserRecord, school: Option<School>) -> Self {
        Self {
            id: record.id,
            email: record.email,
            name: record.name,
            role: record.role,
            school,
            grade: record.grade,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Request body for registering a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    /// School ID, ignored for admins
    #[serde(default)]
    pub school: Option<String>,
    /// Grade label, ignored for anyone but students
    #[serde(default)]
    pub grade: Option<String>,
}

/// Request body for updating an existing user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the profile plus a bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub school: Option<School>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub token: String,
}
