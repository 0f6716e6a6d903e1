//! Configuration error types.

use thiserror::Error;

/// Errors loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Read(#[from] config::ConfigError),
}

/// Errors from semantic validation of loaded configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(&'static str),

    #[error("Database URL must be a postgres:// or postgresql:// URL")]
    InvalidDatabaseUrl,

    #[error("Database pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Gateway base URL must be an http(s) URL")]
    InvalidGatewayUrl,

    #[error("Gateway request timeout must be positive")]
    InvalidGatewayTimeout,

    #[error("Dues value must be positive")]
    InvalidDuesValue,
}
