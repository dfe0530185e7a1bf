//! In-memory dataset and the typed row view over it.

use crate::status::RowStatus;
use crate::target::Target;

use super::DatasetError;

/// Ordered rows with named columns. Every cell is kept as text so columns the
/// batch does not touch round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

/// Column indexes a run reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetColumns {
    pub item_id: usize,
    pub text: usize,
    pub status: usize,
    pub tx_id: usize,
}

/// One row as seen by the batch for a given target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Position in the dataset.
    pub index: usize,
    pub item_id: String,
    pub text: String,
    pub status: RowStatus,
    /// Last job id recorded for this target, kept even after the job finished.
    pub job_id: Option<String>,
}

impl Dataset {
    /// Create a dataset. Short records are padded with empty cells.
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let records = records
            .into_iter()
            .map(|mut record| {
                if record.len() < width {
                    record.resize(width, String::new());
                }
                record
            })
            .collect();
        Self { headers, records }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of `name`, appending an empty column if it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.headers.push(name.to_string());
        for record in &mut self.records {
            record.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Cell text, empty if the cell is absent.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.records
            .get(row)
            .and_then(|record| record.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Overwrite one cell. Out-of-range rows are ignored.
    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) {
        if let Some(record) = self.records.get_mut(row) {
            if record.len() <= column {
                record.resize(column + 1, String::new());
            }
            record[column] = value.into();
        }
    }

    /// Resolve the columns for `target`, creating its status/tx-id columns when missing.
    ///
    /// The item-id column and the text column (named after the language code)
    /// must already exist.
    pub fn bind(
        &mut self,
        target: &Target,
        item_id_column: &str,
    ) -> Result<TargetColumns, DatasetError> {
        let item_id = self
            .column_index(item_id_column)
            .ok_or_else(|| DatasetError::MissingColumn {
                column: item_id_column.to_string(),
            })?;
        let text = self
            .column_index(target.text_column())
            .ok_or_else(|| DatasetError::MissingColumn {
                column: target.text_column().to_string(),
            })?;
        let status = self.ensure_column(&target.status_column());
        let tx_id = self.ensure_column(&target.tx_id_column());

        Ok(TargetColumns {
            item_id,
            text,
            status,
            tx_id,
        })
    }

    /// Typed view of row `index`.
    pub fn row(&self, index: usize, columns: &TargetColumns) -> Option<Row> {
        if index >= self.records.len() {
            return None;
        }
        let job_id = self.cell(index, columns.tx_id);
        Some(Row {
            index,
            item_id: self.cell(index, columns.item_id).to_string(),
            text: self.cell(index, columns.text).to_string(),
            status: RowStatus::from_cells(self.cell(index, columns.status), job_id),
            job_id: (!job_id.is_empty()).then(|| job_id.to_string()),
        })
    }
}
