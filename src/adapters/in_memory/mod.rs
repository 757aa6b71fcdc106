//! In-memory production relation and its JSON loader.

mod dataset_loader;
mod production_table;

pub use dataset_loader::{DatasetLoadError, JsonDatasetLoader};
pub use production_table::InMemoryProductionTable;
