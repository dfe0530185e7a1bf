//! Tabular dataset holding the rows to synthesize and their per-target state.
//!
//! The whole dataset is loaded once, mutated in memory, and written back as a
//! whole through a [`DatasetStore`]. Keeping persistence behind the trait lets
//! an incremental store replace the file rewrite without touching the batch.

mod csv_store;
mod destination;
mod error;
mod types;

pub use csv_store::CsvDatasetStore;
pub use destination::{default_snapshot_path, resolve_destination, Destination};
pub use error::DatasetError;
pub use types::{Dataset, Row, TargetColumns};

/// Load/save access to a dataset.
pub trait DatasetStore: Send + Sync {
    /// Human-readable description of where saves go.
    fn describe(&self) -> String;

    /// Load the full dataset.
    fn load(&self) -> Result<Dataset, DatasetError>;

    /// Persist the full dataset.
    fn save(&self, dataset: &Dataset) -> Result<(), DatasetError>;
}
