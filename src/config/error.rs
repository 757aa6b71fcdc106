//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed ({0})")]
    PoolSizeTooLarge(u32),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid log directive: {0}")]
    InvalidLogLevel(String),

    #[error("Migrations only create `production_records`, but the dataset table is {0}")]
    MigrationsRequireDefaultTable(String),
}
