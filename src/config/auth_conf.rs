use serde::{Deserialize, Serialize};
use std::env;
use tracing::{error, info, warn};

use crate::config::ConfigError;

/// Fixed buyer and manufacturer identities configured from the environment.
///
/// Each identity may carry either a plaintext password or an Argon2 hash;
/// when both are present the hash wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUsersConfig {
    pub buyer_username: Option<String>,
    pub buyer_password: Option<String>,
    pub buyer_password_hash: Option<String>,
    pub manufacturer_username: Option<String>,
    pub manufacturer_password: Option<String>,
    pub manufacturer_password_hash: Option<String>,
}

impl AuthUsersConfig {
    /// Load the configured identities from environment variables
    ///
    /// Expected environment variables:
    /// - BUYER_USERNAME / BUYER_PASSWORD / BUYER_PASSWORD_HASH
    /// - MANUFACTURER_USERNAME / MANUFACTURER_PASSWORD / MANUFACTURER_PASSWORD_HASH
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading authentication users from environment variables");

        let config = Self {
            buyer_username: env::var("BUYER_USERNAME").ok(),
            buyer_password: env::var("BUYER_PASSWORD").ok(),
            buyer_password_hash: env::var("BUYER_PASSWORD_HASH").ok(),
            manufacturer_username: env::var("MANUFACTURER_USERNAME").ok(),
            manufacturer_password: env::var("MANUFACTURER_PASSWORD").ok(),
            manufacturer_password_hash: env::var("MANUFACTURER_PASSWORD_HASH").ok(),
        };
        config.validate()?;

        info!("Authentication users loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buyer_username.is_none() && self.manufacturer_username.is_none() {
            error!("No authentication users configured");
            return Err(ConfigError::ValidationError(
                "At least one of BUYER_USERNAME or MANUFACTURER_USERNAME must be set".to_string(),
            ));
        }
        if self.buyer_username.is_some()
            && self.buyer_password.is_none()
            && self.buyer_password_hash.is_none()
        {
            warn!("BUYER_USERNAME is set without a password or password hash");
        }
        if self.manufacturer_username.is_some()
            && self.manufacturer_password.is_none()
            && self.manufacturer_password_hash.is_none()
        {
            warn!("MANUFACTURER_USERNAME is set without a password or password hash");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_at_least_one_user() {
        let config = AuthUsersConfig {
            buyer_username: None,
            buyer_password: None,
            buyer_password_hash: None,
            manufacturer_username: None,
            manufacturer_password: None,
            manufacturer_password_hash: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_single_user_ok() {
        let config = AuthUsersConfig {
            buyer_username: Some("buyer".to_string()),
            buyer_password: Some("secret".to_string()),
            buyer_password_hash: None,
            manufacturer_username: None,
            manufacturer_password: None,
            manufacturer_password_hash: None,
        };
        assert!(config.validate().is_ok());
    }
}
