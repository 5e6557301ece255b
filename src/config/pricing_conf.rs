use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info};

use crate::config::ConfigError;

/// Settings for the material rate cache and the hourly rate defaults used
/// when building the live-cost payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Cache validity window in minutes
    pub material_price_cache_minutes: i64,
    /// Default labor rate in INR per hour
    pub default_labor_cost_per_hour: f64,
    /// Default machine rate in INR per hour
    pub default_machine_cost_per_hour: f64,
}

impl PricingConfig {
    /// Load pricing configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MATERIAL_PRICE_CACHE_MINUTES: cache TTL (defaults to 1440, i.e. 24h)
    /// - DEFAULT_LABOR_COST_INR: labor rate per hour (defaults to 350)
    /// - DEFAULT_MACHINE_COST_INR: machine rate per hour (defaults to 500)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading pricing configuration from environment variables");

        let material_price_cache_minutes = env::var("MATERIAL_PRICE_CACHE_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1440);
        debug!("Material price cache TTL: {} minutes", material_price_cache_minutes);

        let default_labor_cost_per_hour = env::var("DEFAULT_LABOR_COST_INR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(350.0);

        let default_machine_cost_per_hour = env::var("DEFAULT_MACHINE_COST_INR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(500.0);

        let config = Self {
            material_price_cache_minutes,
            default_labor_cost_per_hour,
            default_machine_cost_per_hour,
        };
        config.validate()?;

        info!("Pricing configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.material_price_cache_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "Material price cache TTL must be positive".to_string(),
            ));
        }
        if self.default_labor_cost_per_hour < 0.0 || self.default_machine_cost_per_hour < 0.0 {
            return Err(ConfigError::InvalidValue(
                "Hourly rate defaults must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            material_price_cache_minutes: 1440,
            default_labor_cost_per_hour: 350.0,
            default_machine_cost_per_hour: 500.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PricingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_ttl() {
        let mut config = PricingConfig::default();
        config.material_price_cache_minutes = 0;
        assert!(config.validate().is_err());
    }
}
