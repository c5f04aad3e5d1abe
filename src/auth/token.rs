//! JWT session token creation and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppError;

/// JWT session claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Create a signed session token for a user.
pub fn create_session_token(user_id: &str, config: &Config) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(config.token_ttl_days)).timestamp(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))
}

/// Verify a session token and return its claims.
pub fn verify_session_token(token: &str, config: &Config) -> Result<SessionClaims, AppError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    decode::<SessionClaims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            AppError::Unauthorized("Not authorized, token failed".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Params;

    fn config(secret: &str, ttl_days: i64) -> Config {
        Config {
            jwt_secret: secret.to_string(),
            token_ttl_days: ttl_days,
            argon2: Argon2Params::default(),
            db_path: "./unused.sqlite".into(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            bootstrap_admin: None,
        }
    }

    #[test]
    fn test_token_roundtrip_keeps_subject() {
        let config = config("secret", 30);
        let token = create_session_token("user-1", &config).unwrap();
        let claims = verify_session_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = create_session_token("user-1", &config("secret-a", 30)).unwrap();
        let err = verify_session_token(&token, &config("secret-b", 30)).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Well past the default 60s leeway
        let config = config("secret", -1);
        let token = create_session_token("user-1", &config).unwrap();
        assert!(verify_session_token(&token, &config).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(verify_session_token("not.a.jwt", &config("secret", 30)).is_err());
    }
}
