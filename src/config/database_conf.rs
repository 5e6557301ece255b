use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info, warn};

use crate::config::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DATABASE_URL: SQLite connection string (e.g., "sqlite://partbroker.db")
    /// - DATABASE_MAX_CONNECTIONS: Pool size (defaults to 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading database configuration from environment variables");

        let url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            warn!("DATABASE_URL not set, using default: sqlite://partbroker.db");
            "sqlite://partbroker.db".to_string()
        });
        debug!("Database url: {}", url);

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        debug!("Database pool size: {}", max_connections);

        let config = Self {
            url,
            max_connections,
        };
        config.validate()?;

        info!("Database configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "Database url cannot be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "Database pool size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://partbroker.db".to_string(),
            max_connections: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DatabaseConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_url() {
        let mut config = DatabaseConfig::default();
        config.url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_pool_size() {
        let mut config = DatabaseConfig::default();
        config.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
