use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub jwt_secret: String,
    /// Access token lifetime in minutes
    pub access_token_expiration: i64,
    /// Refresh token lifetime in minutes
    pub refresh_token_expiration: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - AUTH_SECRET_KEY: HMAC secret for token signing
    /// - ACCESS_TOKEN_EXPIRE_MINUTES: access token lifetime (defaults to 480)
    /// - REFRESH_TOKEN_EXPIRE_MINUTES: refresh token lifetime (defaults to 10080)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = env::var("AUTH_SECRET_KEY").map_err(|_| {
            error!("AUTH_SECRET_KEY environment variable not found");
            ConfigError::EnvVarNotFound("AUTH_SECRET_KEY".to_string())
        })?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let access_token_expiration = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(480);

        let refresh_token_expiration = env::var("REFRESH_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10080);

        let config = Self {
            jwt_secret,
            access_token_expiration,
            refresh_token_expiration,
        };
        config.validate()?;

        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "JWT secret cannot be empty".to_string(),
            ));
        }
        if self.jwt_secret == "change-me" {
            warn!("AUTH_SECRET_KEY is using the default value. Change it in .env.");
        }
        if self.access_token_expiration <= 0 || self.refresh_token_expiration <= 0 {
            return Err(ConfigError::ValidationError(
                "Token expirations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
