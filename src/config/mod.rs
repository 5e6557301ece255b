pub mod app_conf;
pub mod auth_conf;
pub mod database_conf;
pub mod jwt_conf;
pub mod minio_conf;
pub mod pricing_conf;

pub use auth_conf::AuthUsersConfig;
pub use database_conf::DatabaseConfig;
pub use jwt_conf::JwtConfig;
pub use minio_conf::MinioConfig;
pub use pricing_conf::PricingConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
