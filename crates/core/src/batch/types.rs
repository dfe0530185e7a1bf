//! Batch settings, per-row outcomes and the run report.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::config::Config;

use super::{PollSettings, RowError};

/// Everything the driver needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Column holding the stable item identifier.
    pub item_id_column: String,
    /// Root of the local audio tree.
    pub audio_dir: PathBuf,
    /// Extension of downloaded assets, without the dot.
    pub audio_extension: String,
    /// Minimum spacing between the starts of two outbound calls.
    pub min_call_interval: Duration,
    pub poll: PollSettings,
    /// Persist after every row whose state changed.
    pub checkpoint_each_row: bool,
}

impl BatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            item_id_column: config.storage.item_id_column.clone(),
            audio_dir: config.storage.audio_dir.clone(),
            audio_extension: config
                .storage
                .audio_extension
                .trim_start_matches('.')
                .to_string(),
            min_call_interval: config.batch.min_call_interval(),
            poll: PollSettings {
                interval: config.batch.poll_interval(),
                timeout: config.batch.poll_timeout(),
                max_attempts: config.batch.max_poll_attempts,
            },
            checkpoint_each_row: config.batch.checkpoint_each_row,
        }
    }
}

/// What happened to one row during a run.
#[derive(Debug)]
pub enum RowOutcome {
    /// Nothing to do for this row.
    Skipped,
    /// The asset is on disk and its path is recorded.
    Completed {
        path: PathBuf,
        /// False when the file was already present and no transfer happened.
        downloaded: bool,
    },
    /// The row was marked `error`; a later run resubmits it.
    Failed(RowError),
    /// The row kept its status; a later run resumes at the same step.
    Deferred(RowError),
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Rows in the dataset.
    pub rows: usize,
    /// Jobs submitted during this run.
    pub submitted: usize,
    /// Rows that reached a local file during this run.
    pub completed: usize,
    /// Assets actually transferred.
    pub downloaded: usize,
    /// Assets found on disk, no transfer needed.
    pub already_present: usize,
    pub skipped: usize,
    /// Rows now marked `error`.
    pub failed: usize,
    /// Rows left as they were for a later run (poll timeouts, download failures, empty text).
    pub deferred: usize,
    /// Where the dataset was persisted.
    pub destination: String,
}

impl BatchReport {
    pub fn new(rows: usize, destination: impl Into<String>) -> Self {
        Self {
            rows,
            destination: destination.into(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Completed { downloaded, .. } => {
                self.completed += 1;
                if *downloaded {
                    self.downloaded += 1;
                } else {
                    self.already_present += 1;
                }
            }
            RowOutcome::Failed(_) => self.failed += 1,
            RowOutcome::Deferred(_) => self.deferred += 1,
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows: {} submitted, {} completed ({} downloaded, {} already present), {} skipped, {} failed, {} deferred -> {}",
            self.rows,
            self.submitted,
            self.completed,
            self.downloaded,
            self.already_present,
            self.skipped,
            self.failed,
            self.deferred,
            self.destination
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.storage.audio_extension = ".wav".to_string();
        config.batch.poll_timeout_secs = 0;

        let settings = BatchSettings::from_config(&config);
        assert_eq!(settings.audio_extension, "wav");
        assert_eq!(settings.min_call_interval, Duration::from_millis(1200));
        assert_eq!(settings.poll.timeout, None);
        assert_eq!(settings.poll.interval, Duration::from_secs(2));
        assert!(settings.checkpoint_each_row);
    }

    #[test]
    fn test_report_counts() {
        let mut report = BatchReport::new(5, "out.csv");
        report.record(&RowOutcome::Skipped);
        report.record(&RowOutcome::Completed {
            path: PathBuf::from("a.mp3"),
            downloaded: true,
        });
        report.record(&RowOutcome::Completed {
            path: PathBuf::from("b.mp3"),
            downloaded: false,
        });
        report.record(&RowOutcome::Failed(RowError::MissingJobId {
            item_id: "4".to_string(),
        }));
        report.record(&RowOutcome::Deferred(RowError::EmptyText {
            item_id: "5".to_string(),
        }));

        assert_eq!(report.skipped, 1);
        assert_eq!(report.completed, 2);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.already_present, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.deferred, 1);
        assert!(report.to_string().starts_with("5 rows:"));
    }
}
