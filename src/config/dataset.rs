//! Dataset source configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ConfigValidationError;
use crate::adapters::postgres::TableName;

/// Where the production relation is loaded from
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSource {
    /// JSON array of records, held in memory
    #[default]
    Json,
    /// PostgreSQL table queried in place
    Postgres,
}

/// Dataset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default)]
    pub source: DatasetSource,

    /// JSON file path, required for the `json` source
    pub path: Option<PathBuf>,

    /// Table name, optionally schema-qualified, for the `postgres` source
    #[serde(default = "default_table")]
    pub table: String,
}

impl DatasetConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        match self.source {
            DatasetSource::Json if self.path.is_none() => Err(
                ConfigValidationError::MissingRequired("PRODUCTION_INSIGHTS__DATASET__PATH"),
            ),
            DatasetSource::Json => Ok(()),
            DatasetSource::Postgres => TableName::parse(&self.table)
                .map(|_| ())
                .map_err(|_| ConfigValidationError::InvalidTableName(self.table.clone())),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source: DatasetSource::default(),
            path: None,
            table: default_table(),
        }
    }
}

/// Table created by the bundled migrations.
pub const MIGRATED_TABLE: &str = "production_records";

fn default_table() -> String {
    MIGRATED_TABLE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_source_requires_path() {
        let config = DatasetConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MissingRequired(_))
        ));

        let config = DatasetConfig {
            path: Some(PathBuf::from("data/production.json")),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_source_checks_table_name() {
        let config = DatasetConfig {
            source: DatasetSource::Postgres,
            table: "analytics.production_records".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = DatasetConfig {
            source: DatasetSource::Postgres,
            table: "records; DROP TABLE x".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTableName(_))
        ));
    }
}
