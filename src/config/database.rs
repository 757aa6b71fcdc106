//! PostgreSQL connection settings for the production relation.
//!
//! Only read when the dataset source is `postgres`.

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;

/// Largest pool the validator accepts.
pub const MAX_POOL_SIZE: u32 = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Minimum connections to maintain
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Maximum connections allowed
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,

    /// Apply the bundled schema migration before the first query
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PRODUCTION_INSIGHTS__DATABASE__URL",
            ));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ConfigValidationError::InvalidDatabaseUrl);
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigValidationError::InvalidPoolSize);
        }
        if self.max_connections > MAX_POOL_SIZE {
            return Err(ConfigValidationError::PoolSizeTooLarge(MAX_POOL_SIZE));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            run_migrations: false,
        }
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    16
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_max_lifetime() -> u64 {
    1800
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 16);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(10));
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_validation_missing_url() {
        assert!(matches!(
            DatabaseConfig::default().validate(),
            Err(ConfigValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validation_rejects_other_schemes() {
        assert_eq!(
            with_url("mysql://localhost/prod").validate(),
            Err(ConfigValidationError::InvalidDatabaseUrl)
        );
    }

    #[test]
    fn test_validation_pool_bounds() {
        let inverted = DatabaseConfig {
            min_connections: 10,
            max_connections: 5,
            ..with_url("postgres://localhost/prod")
        };
        assert_eq!(inverted.validate(), Err(ConfigValidationError::InvalidPoolSize));

        let oversized = DatabaseConfig {
            max_connections: MAX_POOL_SIZE + 1,
            ..with_url("postgres://localhost/prod")
        };
        assert_eq!(
            oversized.validate(),
            Err(ConfigValidationError::PoolSizeTooLarge(MAX_POOL_SIZE))
        );
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(with_url("postgresql://analyst@localhost:5432/production")
            .validate()
            .is_ok());
    }
}
