//! JSON Dataset Loader
//!
//! Reads a JSON array of production records from disk and builds an
//! [`InMemoryProductionTable`] from it.

use std::path::{Path, PathBuf};
use tokio::fs;

use super::production_table::InMemoryProductionTable;
use crate::domain::production::ProductionRecord;

/// Errors that can occur while loading a dataset file
#[derive(Debug, thiserror::Error)]
pub enum DatasetLoadError {
    #[error("Dataset file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading dataset: {0}")]
    IoError(String),

    #[error("Malformed dataset: {0}")]
    Malformed(String),
}

/// Loads production records from a JSON file
#[derive(Debug, Clone)]
pub struct JsonDatasetLoader {
    path: PathBuf,
}

impl JsonDatasetLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse every record in the file
    pub async fn load_records(&self) -> Result<Vec<ProductionRecord>, DatasetLoadError> {
        if !self.path.exists() {
            return Err(DatasetLoadError::NotFound(self.path.clone()));
        }

        let json = fs::read_to_string(&self.path)
            .await
            .map_err(|e| DatasetLoadError::IoError(e.to_string()))?;

        serde_json::from_str(&json).map_err(|e| DatasetLoadError::Malformed(e.to_string()))
    }

    /// Read the file into a queryable table
    pub async fn load(&self) -> Result<InMemoryProductionTable, DatasetLoadError> {
        let records = self.load_records().await?;
        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "Loaded production dataset"
        );
        Ok(InMemoryProductionTable::new(records))
    }
}
