//! CSV file backed dataset store.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use super::{Dataset, DatasetError, DatasetStore, Destination};

/// Reads the input CSV and writes whole-file snapshots to a [`Destination`].
#[derive(Debug, Clone)]
pub struct CsvDatasetStore {
    input: PathBuf,
    destination: Destination,
}

impl CsvDatasetStore {
    pub fn new(input: impl Into<PathBuf>, destination: Destination) -> Self {
        Self {
            input: input.into(),
            destination,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Sibling temp file the snapshot is staged in before the rename.
    fn staging_path(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.csv".to_string());
        path.with_file_name(format!(".{}.tmp", file_name))
    }

    fn write_csv(path: &Path, dataset: &Dataset) -> Result<(), csv::Error> {
        let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
        writer.write_record(dataset.headers())?;
        for record in dataset.records() {
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl DatasetStore for CsvDatasetStore {
    fn describe(&self) -> String {
        self.destination.to_string()
    }

    fn load(&self) -> Result<Dataset, DatasetError> {
        if !self.input.exists() {
            return Err(DatasetError::load_failed(&self.input, "file not found"));
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.input)
            .map_err(|e| DatasetError::load_failed(&self.input, e))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DatasetError::load_failed(&self.input, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DatasetError::load_failed(&self.input, e))?;
            records.push(record.iter().map(str::to_string).collect());
        }

        debug!(
            "Loaded {} rows x {} columns from {}",
            records.len(),
            headers.len(),
            self.input.display()
        );
        Ok(Dataset::new(headers, records))
    }

    fn save(&self, dataset: &Dataset) -> Result<(), DatasetError> {
        let path = self.destination.path();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DatasetError::save_failed(path, e))?;
        }

        let staging = Self::staging_path(path);
        if let Err(e) = Self::write_csv(&staging, dataset) {
            let _ = fs::remove_file(&staging);
            return Err(DatasetError::save_failed(path, e));
        }
        fs::rename(&staging, path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            DatasetError::save_failed(path, e)
        })?;

        debug!("Saved {} rows to {}", dataset.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INPUT: &str = "item_id,labels,en,es-CO\n\
                         1,intro,\"Hello, world\",\"Hola, mundo\"\n\
                         2,quiz,Bye,Chao\n";

    fn write_input(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("items.csv");
        fs::write(&path, INPUT).unwrap();
        path
    }

    #[test]
    fn test_load() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir);
        let store = CsvDatasetStore::new(&input, Destination::Override(input.clone()));

        let dataset = store.load().unwrap();
        assert_eq!(dataset.headers(), &["item_id", "labels", "en", "es-CO"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.cell(0, 2), "Hello, world");
        assert_eq!(dataset.cell(1, 3), "Chao");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("missing.csv");
        let store = CsvDatasetStore::new(&input, Destination::Override(input.clone()));
        assert!(matches!(
            store.load(),
            Err(DatasetError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_override_round_trip_is_lossless() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir);
        let store = CsvDatasetStore::new(&input, Destination::Override(input.clone()));

        let dataset = store.load().unwrap();
        store.save(&dataset).unwrap();

        assert_eq!(fs::read_to_string(&input).unwrap(), INPUT);
        assert!(!CsvDatasetStore::staging_path(&input).exists());
    }

    #[test]
    fn test_snapshot_creates_parent_dirs_and_keeps_input() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir);
        let output = dir.path().join("snapshots_u").join("tts_1_u.csv");
        let store = CsvDatasetStore::new(&input, Destination::Snapshot(output.clone()));

        let mut dataset = store.load().unwrap();
        let status = dataset.ensure_column("tts_es-CO_Salome_status");
        dataset.set_cell(0, status, "in_progress");
        store.save(&dataset).unwrap();

        assert_eq!(fs::read_to_string(&input).unwrap(), INPUT);
        let reloaded = CsvDatasetStore::new(&output, Destination::Snapshot(output.clone()))
            .load()
            .unwrap();
        assert_eq!(reloaded.cell(0, status), "in_progress");
        assert_eq!(reloaded.cell(1, status), "");
        assert_eq!(store.describe(), format!("{} (snapshot)", output.display()));
    }
}
