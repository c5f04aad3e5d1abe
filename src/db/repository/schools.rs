use sqlx::{sqlite::SqliteRow, Row};

use super::{from_json, now_timestamp, present, to_json, Repository};
use crate::errors::AppError;
use crate::models::{CreateSchoolRequest, School, SchoolType, UpdateSchoolRequest};

const SCHOOL_COLUMNS: &str =
    "id, name, address, school_type, grades_offered, created_at, updated_at";

impl Repository {
    /// List all schools.
    pub async fn list_schools(&self) -> Result<Vec<School>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM schools ORDER BY name",
            SCHOOL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(school_from_row).collect()
    }

    /// Get a school by ID.
    pub async fn get_school(&self, id: &str) -> Result<Option<School>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM schools WHERE id = ?",
            SCHOOL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(school_from_row).transpose()
    }

    /// Create a new school.
    pub async fn create_school(&self, request: &CreateSchoolRequest) -> Result<School, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            "INSERT INTO schools (id, name, address, school_type, grades_offered, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(request.name.trim())
        .bind(request.address.trim())
        .bind(request.school_type.as_str())
        .bind(to_json(&request.grades_offered)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(School {
            id,
            name: request.name.trim().to_string(),
            address: request.address.trim().to_string(),
            school_type: request.school_type,
            grades_offered: request.grades_offered.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a partial update. Empty strings leave the stored value untouched.
    pub async fn update_school(
        &self,
        existing: School,
        request: &UpdateSchoolRequest,
    ) -> Result<School, AppError> {
        let now = now_timestamp();
        let name = present(&request.name)
            .map(|s| s.trim().to_string())
            .unwrap_or(existing.name);
        let address = present(&request.address)
            .map(|s| s.trim().to_string())
            .unwrap_or(existing.address);
        let school_type = request.school_type.unwrap_or(existing.school_type);
        let grades_offered = request
            .grades_offered
            .clone()
            .unwrap_or(existing.grades_offered);

        sqlx::query(
            "UPDATE schools SET name = ?, address = ?, school_type = ?, grades_offered = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(&address)
        .bind(school_type.as_str())
        .bind(to_json(&grades_offered)?)
        .bind(&now)
        .bind(&existing.id)
        .execute(&self.pool)
        .await?;

        Ok(School {
            id: existing.id,
            name,
            address,
            school_type,
            grades_offered,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Count users, courses, events and schedules that reference a school.
    pub async fn count_school_dependents(&self, id: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            r#"SELECT
                (SELECT COUNT(*) FROM users WHERE school_id = ?1)
              + (SELECT COUNT(*) FROM courses WHERE school_id = ?1)
              + (SELECT COUNT(*) FROM calendar_events WHERE school_id = ?1)
              + (SELECT COUNT(*) FROM bell_schedules WHERE school_id = ?1) AS total"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("total")?)
    }

    /// Delete a school.
    pub async fn delete_school(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM schools WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(still_referenced)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("School {} not found", id)));
        }
        Ok(())
    }
}

fn still_referenced(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::Conflict("School still has dependent records".to_string())
        }
        _ => err.into(),
    }
}

fn school_from_row(row: &SqliteRow) -> Result<School, AppError> {
    let school_type: String = row.try_get("school_type")?;
    let grades_offered: String = row.try_get("grades_offered")?;

    Ok(School {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        school_type: SchoolType::parse(&school_type).ok_or_else(|| {
            AppError::Database(format!("Unknown school type '{}'", school_type))
        })?,
        grades_offered: from_json(&grades_offered)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::db::{init_database, NewUser};
    use crate::models::Role;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_delete_referenced_school_is_conflict() {
        let (repo, _dir) = repo().await;
        let school = repo
            .create_school(&CreateSchoolRequest {
                name: "North High".to_string(),
                address: "1 Main St".to_string(),
                school_type: SchoolType::High,
                grades_offered: vec!["9".to_string()],
            })
            .await
            .unwrap();
        repo.create_user(&NewUser {
            email: "staff@north.test".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            name: "Staff".to_string(),
            role: Role::Staff,
            school_id: Some(school.id.clone()),
            grade: None,
        })
        .await
        .unwrap();

        // Skips the dependents count, as a concurrent insert would
        let err = repo.delete_school(&school.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(repo.get_school(&school.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_school_is_not_found() {
        let (repo, _dir) = repo().await;
        let err = repo.delete_school("nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
