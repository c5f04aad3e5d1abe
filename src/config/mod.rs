//! Configuration module for the Timely backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::Argon2Params;
use crate::errors::AppError;

/// Upper bound for session token lifetime, in days.
const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Credentials for the admin account created at startup when none exists.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign session tokens
    pub jwt_secret: String,
    /// Session token lifetime in days
    pub token_ttl_days: i64,
    /// Password hashing cost
    pub argon2: Argon2Params,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Admin account to create on first start
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("TIMELY_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!(
                    "No TIMELY_JWT_SECRET configured, generating a per-process secret. Sessions will not survive a restart!"
                );
                format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
            }
        };

        let token_ttl_days = match env::var("TIMELY_TOKEN_TTL_DAYS") {
            Ok(raw) => parse_token_ttl_days(&raw)?,
            Err(_) => 30,
        };

        let db_path = env::var("TIMELY_DB_PATH")
            .unwrap_or_else(|_| "./data/timely.sqlite".to_string())
            .into();

        let raw_addr =
            env::var("TIMELY_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let bind_addr = raw_addr.parse().map_err(|_| {
            AppError::Internal(format!("Invalid TIMELY_BIND_ADDR format: {}", raw_addr))
        })?;

        let log_level = log_level_from_env();

        let bootstrap_admin = match (
            env::var("TIMELY_ADMIN_EMAIL"),
            env::var("TIMELY_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin {
                    email,
                    password,
                    name: env::var("TIMELY_ADMIN_NAME")
                        .unwrap_or_else(|_| "System Administrator".to_string()),
                })
            }
            _ => None,
        };

        Ok(Self {
            jwt_secret,
            token_ttl_days,
            argon2: Argon2Params::default(),
            db_path,
            bind_addr,
            log_level,
            bootstrap_admin,
        })
    }
}

/// Log level from `TIMELY_LOG_LEVEL`. Readable before the rest of the
/// configuration so logging can start first.
pub fn log_level_from_env() -> String {
    env::var("TIMELY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

fn parse_token_ttl_days(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|days| (1..=MAX_TOKEN_TTL_DAYS).contains(days))
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid TIMELY_TOKEN_TTL_DAYS value: {} (expected 1 to {})",
                raw, MAX_TOKEN_TTL_DAYS
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("TIMELY_JWT_SECRET");
        env::remove_var("TIMELY_TOKEN_TTL_DAYS");
        env::remove_var("TIMELY_DB_PATH");
        env::remove_var("TIMELY_BIND_ADDR");
        env::remove_var("TIMELY_LOG_LEVEL");
        env::remove_var("TIMELY_ADMIN_EMAIL");
        env::remove_var("TIMELY_ADMIN_PASSWORD");

        let config = Config::from_env().unwrap();

        assert_eq!(config.jwt_secret.len(), 64);
        assert_eq!(config.token_ttl_days, 30);
        assert_eq!(config.db_path, PathBuf::from("./data/timely.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.log_level, "info");
        assert!(config.bootstrap_admin.is_none());
        assert_eq!(log_level_from_env(), "info");
    }

    #[test]
    fn test_token_ttl_bounds() {
        assert_eq!(parse_token_ttl_days("7").unwrap(), 7);
        assert_eq!(parse_token_ttl_days("3650").unwrap(), 3650);
        assert!(parse_token_ttl_days("0").is_err());
        assert!(parse_token_ttl_days("-1").is_err());
        assert!(parse_token_ttl_days("3651").is_err());
        assert!(parse_token_ttl_days("9223372036854775807").is_err());
        assert!(parse_token_ttl_days("a week").is_err());
    }
}
