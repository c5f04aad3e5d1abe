use std::collections::HashMap;

use sqlx::{sqlite::SqliteRow, Row};

use super::{now_timestamp, Repository};
use crate::errors::AppError;
use crate::models::{Role, User, UserRecord};

const USER_COLUMNS: &str =
    "id, email, password_hash, name, role, school_id, grade, created_at, updated_at";

/// A user ready to insert, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub school_id: Option<String>,
    pub grade: Option<String>,
}

/// Resolved field values for a user update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub grade: Option<String>,
}

impl Repository {
    /// Get a stored user, including the password hash.
    pub async fn get_user_record(&self, id: &str) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Look a user up by email. Emails are stored lowercased.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Get a user with their school embedded.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        match self.get_user_record(id).await? {
            Some(record) => Ok(Some(self.with_school(record).await?)),
            None => Ok(None),
        }
    }

    /// Embed the referenced school into a stored user.
    pub async fn with_school(&self, record: UserRecord) -> Result<User, AppError> {
        let school = match &record.school_id {
            Some(school_id) => self.get_school(school_id).await?,
            None => None,
        };
        Ok(User::from_record(record, school))
    }

    /// List all users with their schools embedded.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY name",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let schools: HashMap<String, _> = self
            .list_schools()
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        rows.iter()
            .map(|row| {
                let record = user_from_row(row)?;
                let school = record
                    .school_id
                    .as_ref()
                    .and_then(|id| schools.get(id))
                    .cloned();
                Ok(User::from_record(record, school))
            })
            .collect()
    }

    /// Insert a user.
    pub async fn create_user(&self, user: &NewUser) -> Result<UserRecord, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();
        let email = normalize_email(&user.email);

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, role, school_id, grade, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&email)
        .bind(&user.password_hash)
        .bind(user.name.trim())
        .bind(user.role.as_str())
        .bind(&user.school_id)
        .bind(&user.grade)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(email_conflict)?;

        Ok(UserRecord {
            id,
            email,
            password_hash: user.password_hash.clone(),
            name: user.name.trim().to_string(),
            role: user.role,
            school_id: user.school_id.clone(),
            grade: user.grade.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a stored user.
    pub async fn update_user(
        &self,
        existing: UserRecord,
        changes: UserChanges,
    ) -> Result<UserRecord, AppError> {
        let now = now_timestamp();
        let email = changes
            .email
            .map(|e| normalize_email(&e))
            .unwrap_or(existing.email);
        let password_hash = changes.password_hash.unwrap_or(existing.password_hash);
        let name = changes
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let grade = changes.grade.or(existing.grade);

        sqlx::query(
            "UPDATE users SET email = ?, password_hash = ?, name = ?, grade = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(&name)
        .bind(&grade)
        .bind(&now)
        .bind(&existing.id)
        .execute(&self.pool)
        .await
        .map_err(email_conflict)?;

        Ok(UserRecord {
            id: existing.id,
            email,
            password_hash,
            name,
            role: existing.role,
            school_id: existing.school_id,
            grade,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a user. Courses the user owns go with them.
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_conflict(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::BadRequest("User already exists".to_string())
        }
        _ => err.into(),
    }
}

fn user_from_row(row: &SqliteRow) -> Result<UserRecord, AppError> {
    let role: String = row.try_get("role")?;

    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        role: Role::parse(&role)
            .ok_or_else(|| AppError::Database(format!("Unknown role '{}'", role)))?,
        school_id: row.try_get("school_id")?,
        grade: row.try_get("grade")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Admin@Timely.COM "), "admin@timely.com");
    }
}
