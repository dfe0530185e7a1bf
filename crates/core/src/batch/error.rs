//! Row-scoped error types.

use std::time::Duration;
use thiserror::Error;

use crate::tts_client::TtsClientError;

/// Errors confined to a single row. None of them stop the batch.
#[derive(Debug, Error)]
pub enum RowError {
    /// The vendor did not accept the job.
    #[error("Submission failed for item {item_id}: {source}")]
    SubmissionFailed {
        item_id: String,
        #[source]
        source: TtsClientError,
    },

    /// The vendor reported the job as failed.
    #[error("Transcription failed for job {job_id}: {message}")]
    TranscriptionFailed { job_id: String, message: String },

    /// The job did not finish within the poll budget.
    #[error("Gave up on job {job_id} after {attempts} status checks over {waited:?}")]
    PollTimeout {
        job_id: String,
        attempts: u32,
        waited: Duration,
    },

    /// A status check failed in a way retrying will not fix this run.
    #[error("Status check for job {job_id} failed: {source}")]
    PollFailed {
        job_id: String,
        #[source]
        source: TtsClientError,
    },

    /// The finished asset could not be downloaded or written.
    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Row is marked in progress but carries no job id.
    #[error("Item {item_id} is in progress but has no job id")]
    MissingJobId { item_id: String },

    /// Row has no item id, so its asset could never be stored.
    #[error("Row {row} has no item id")]
    EmptyItemId { row: usize },

    /// Row has nothing to synthesize.
    #[error("Item {item_id} has no text to synthesize")]
    EmptyText { item_id: String },
}

impl RowError {
    /// Whether the row's status should be set to `error`.
    ///
    /// The other kinds leave the status untouched so a later run resumes at the
    /// same step.
    pub fn marks_row_failed(&self) -> bool {
        matches!(
            self,
            Self::SubmissionFailed { .. }
                | Self::TranscriptionFailed { .. }
                | Self::MissingJobId { .. }
        )
    }

    pub fn download_failed(url: &str, reason: impl ToString) -> Self {
        Self::DownloadFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_row_failed() {
        assert!(RowError::SubmissionFailed {
            item_id: "1".to_string(),
            source: TtsClientError::Timeout,
        }
        .marks_row_failed());
        assert!(RowError::TranscriptionFailed {
            job_id: "J".to_string(),
            message: "bad".to_string(),
        }
        .marks_row_failed());
        assert!(RowError::MissingJobId {
            item_id: "1".to_string()
        }
        .marks_row_failed());

        assert!(!RowError::PollTimeout {
            job_id: "J".to_string(),
            attempts: 3,
            waited: Duration::from_secs(1),
        }
        .marks_row_failed());
        assert!(!RowError::PollFailed {
            job_id: "J".to_string(),
            source: TtsClientError::NotConfigured("rejected".to_string()),
        }
        .marks_row_failed());
        assert!(!RowError::download_failed("https://x/a.mp3", "reset").marks_row_failed());
        assert!(!RowError::EmptyItemId { row: 0 }.marks_row_failed());
        assert!(!RowError::EmptyText {
            item_id: "1".to_string()
        }
        .marks_row_failed());
    }
}
