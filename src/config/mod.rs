//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PRODUCTION_INSIGHTS` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use production_insights::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod dataset;
mod error;
mod logging;

pub use database::{DatabaseConfig, MAX_POOL_SIZE};
pub use dataset::{DatasetConfig, DatasetSource, MIGRATED_TABLE};
pub use error::{ConfigError, ConfigValidationError};
pub use logging::{LogFormat, LoggingConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Where the production relation comes from
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// PostgreSQL connection, required for the `postgres` source
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PRODUCTION_INSIGHTS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PRODUCTION_INSIGHTS__DATASET__SOURCE=postgres` -> `dataset.source = postgres`
    /// - `PRODUCTION_INSIGHTS__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PRODUCTION_INSIGHTS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` when the chosen dataset source lacks
    /// what it needs or any section holds an invalid value.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.dataset.validate()?;
        self.logging.validate()?;
        match (&self.dataset.source, &self.database) {
            (DatasetSource::Postgres, None) => Err(ConfigValidationError::MissingRequired(
                "PRODUCTION_INSIGHTS__DATABASE__URL",
            )),
            (DatasetSource::Postgres, Some(database))
                if database.run_migrations && self.dataset.table != MIGRATED_TABLE =>
            {
                Err(ConfigValidationError::MigrationsRequireDefaultTable(
                    self.dataset.table.clone(),
                ))
            }
            (_, Some(database)) => database.validate(),
            (DatasetSource::Json, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = [
        "PRODUCTION_INSIGHTS__DATASET__SOURCE",
        "PRODUCTION_INSIGHTS__DATASET__PATH",
        "PRODUCTION_INSIGHTS__DATASET__TABLE",
        "PRODUCTION_INSIGHTS__DATABASE__URL",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_json_source_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PRODUCTION_INSIGHTS__DATASET__PATH", "data/production.json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.dataset.source, DatasetSource::Json);
        assert_eq!(
            config.dataset.path.as_deref(),
            Some(std::path::Path::new("data/production.json"))
        );
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_postgres_source_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PRODUCTION_INSIGHTS__DATASET__SOURCE", "postgres");
        env::set_var("PRODUCTION_INSIGHTS__DATASET__TABLE", "analytics.production");
        env::set_var("PRODUCTION_INSIGHTS__DATABASE__URL", "postgres://localhost/prod");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.dataset.source, DatasetSource::Postgres);
        assert_eq!(config.dataset.table, "analytics.production");
        assert_eq!(
            config.database.as_ref().map(|db| db.url.as_str()),
            Some("postgres://localhost/prod")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_source_requires_database() {
        let config = AppConfig {
            dataset: DatasetConfig {
                source: DatasetSource::Postgres,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_migrations_only_apply_to_default_table() {
        let config = |table: &str, run_migrations: bool| AppConfig {
            dataset: DatasetConfig {
                source: DatasetSource::Postgres,
                table: table.to_string(),
                ..Default::default()
            },
            database: Some(DatabaseConfig {
                url: "postgres://localhost/prod".to_string(),
                run_migrations,
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(
            config("analytics.production", true).validate(),
            Err(ConfigValidationError::MigrationsRequireDefaultTable(
                "analytics.production".to_string()
            ))
        );
        assert!(config("analytics.production", false).validate().is_ok());
        assert!(config(MIGRATED_TABLE, true).validate().is_ok());
    }
}
