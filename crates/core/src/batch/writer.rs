//! Applies row transitions to the in-memory dataset.

use crate::dataset::{Dataset, Row, TargetColumns};
use crate::status::RowStatus;

/// Sole writer of the dataset during a run.
///
/// Only the status and job-id columns of the bound target are ever written;
/// columns of other targets stay untouched.
pub struct RowStateWriter<'a> {
    dataset: &'a mut Dataset,
    columns: TargetColumns,
    dirty: bool,
}

impl<'a> RowStateWriter<'a> {
    pub fn new(dataset: &'a mut Dataset, columns: TargetColumns) -> Self {
        Self {
            dataset,
            columns,
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row> {
        self.dataset.row(index, &self.columns)
    }

    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    /// Record `status` for row `index`. Returns whether anything changed.
    ///
    /// The job-id cell is only written when the status carries a job id, so a
    /// previous id stays around for diagnostics after the job finished.
    pub fn apply(&mut self, index: usize, status: &RowStatus) -> bool {
        let mut changed = false;

        let encoded = status.encode();
        if self.dataset.cell(index, self.columns.status) != encoded {
            self.dataset
                .set_cell(index, self.columns.status, encoded.to_string());
            changed = true;
        }

        if let Some(job_id) = status.job_id() {
            if self.dataset.cell(index, self.columns.tx_id) != job_id {
                self.dataset
                    .set_cell(index, self.columns.tx_id, job_id.to_string());
                changed = true;
            }
        }

        self.dirty |= changed;
        changed
    }

    /// Whether there are changes since the last call, resetting the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Target;
    use crate::testing::fixtures;

    #[test]
    fn test_apply_writes_only_target_columns() {
        let mut dataset = fixtures::dataset("es-CO", &[("1", "Hola"), ("2", "Chao")]);
        let other = dataset.bind(&Target::new("es-CO", "Other"), "item_id").unwrap();
        dataset.set_cell(0, other.status, "done.mp3");
        dataset.set_cell(0, other.tx_id, "old");
        let columns = dataset.bind(&fixtures::target(), "item_id").unwrap();
        let before = dataset.clone();

        let mut writer = RowStateWriter::new(&mut dataset, columns);
        assert!(writer.apply(
            0,
            &RowStatus::InProgress {
                job_id: "job-1".to_string()
            }
        ));

        for (row, record) in dataset.records().iter().enumerate() {
            for (col, cell) in record.iter().enumerate() {
                if row == 0 && (col == columns.status || col == columns.tx_id) {
                    continue;
                }
                assert_eq!(cell, before.cell(row, col));
            }
        }
        assert_eq!(dataset.cell(0, columns.status), "in_progress");
        assert_eq!(dataset.cell(0, columns.tx_id), "job-1");
    }

    #[test]
    fn test_job_id_kept_after_completion() {
        let mut dataset = fixtures::dataset("es-CO", &[("1", "Hola")]);
        let columns = dataset.bind(&fixtures::target(), "item_id").unwrap();

        let mut writer = RowStateWriter::new(&mut dataset, columns);
        writer.apply(
            0,
            &RowStatus::InProgress {
                job_id: "job-1".to_string(),
            },
        );
        writer.apply(
            0,
            &RowStatus::Terminal {
                value: "./audio_files/es-CO/1.mp3".to_string(),
            },
        );

        assert_eq!(dataset.cell(0, columns.status), "./audio_files/es-CO/1.mp3");
        assert_eq!(dataset.cell(0, columns.tx_id), "job-1");
    }

    #[test]
    fn test_dirty_tracking() {
        let mut dataset = fixtures::dataset("es-CO", &[("1", "Hola")]);
        let columns = dataset.bind(&fixtures::target(), "item_id").unwrap();
        let mut writer = RowStateWriter::new(&mut dataset, columns);

        assert!(!writer.take_dirty());
        assert!(writer.apply(0, &RowStatus::failed()));
        assert!(writer.take_dirty());
        assert!(!writer.take_dirty());

        assert!(!writer.apply(0, &RowStatus::failed()));
        assert!(!writer.take_dirty());
    }
}
