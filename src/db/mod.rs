//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::auth::{hash_password, Argon2Params};
use crate::config::BootstrapAdmin;
use crate::errors::AppError;
use crate::models::Role;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schools (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            school_type TEXT NOT NULL,
            grades_offered TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            school_id TEXT REFERENCES schools(id),
            grade TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            school_id TEXT NOT NULL REFERENCES schools(id),
            name TEXT NOT NULL,
            grade TEXT NOT NULL,
            period_number INTEGER NOT NULL,
            teacher TEXT NOT NULL DEFAULT '',
            room TEXT NOT NULL DEFAULT '',
            student_id TEXT REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS calendar_events (
            id TEXT PRIMARY KEY,
            school_id TEXT NOT NULL REFERENCES schools(id),
            event_name TEXT NOT NULL,
            start_date_time TEXT NOT NULL,
            end_date_time TEXT NOT NULL,
            additional_details TEXT NOT NULL DEFAULT '',
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bell_schedules (
            id TEXT PRIMARY KEY,
            school_id TEXT NOT NULL REFERENCES schools(id),
            schedule_type TEXT NOT NULL,
            days TEXT NOT NULL DEFAULT '[]',
            dates TEXT NOT NULL DEFAULT '[]',
            grades TEXT NOT NULL DEFAULT '[]',
            slots TEXT NOT NULL DEFAULT '[]',
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_users_school ON users(school_id);
        CREATE INDEX IF NOT EXISTS idx_courses_school_grade ON courses(school_id, grade);
        CREATE INDEX IF NOT EXISTS idx_courses_student ON courses(student_id);
        CREATE INDEX IF NOT EXISTS idx_events_school_start ON calendar_events(school_id, start_date_time);
        CREATE INDEX IF NOT EXISTS idx_bell_schedules_school ON bell_schedules(school_id, created_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the configured admin account unless its email is already registered.
pub async fn ensure_bootstrap_admin(
    repo: &Repository,
    admin: &BootstrapAdmin,
    params: Argon2Params,
) -> Result<bool, AppError> {
    if repo.get_user_by_email(&admin.email).await?.is_some() {
        return Ok(false);
    }

    let password_hash = hash_password(admin.password.clone(), params).await?;
    repo.create_user(&NewUser {
        email: admin.email.clone(),
        password_hash,
        name: admin.name.clone(),
        role: Role::Admin,
        school_id: None,
        grade: None,
    })
    .await?;

    tracing::info!("Created bootstrap admin account {}", admin.email);
    Ok(true)
}
