//! Logging configuration

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::error::ConfigValidationError;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it when set
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Filter from `RUST_LOG`, falling back to the configured directive.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|_| ConfigValidationError::InvalidLogLevel(self.level.clone()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info,production_insights=debug".to_string()
}
