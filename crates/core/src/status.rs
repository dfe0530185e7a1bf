//! Per-row TTS job status and the classifier that turns it into an action.
//!
//! On disk the status is a single string cell. In memory it is a [`RowStatus`],
//! which carries the job id or asset URL as payload and encodes back to the
//! exact same strings when written.

use std::fmt;

/// Status cell value for a row that failed submission or transcription.
pub const STATUS_ERROR: &str = "error";
/// Status cell value for a row that has never been submitted.
pub const STATUS_PENDING: &str = "pending";
/// Status cell value for a row with a job in flight.
pub const STATUS_IN_PROGRESS: &str = "in_progress";
/// Prefix that marks a status cell as a downloadable asset URL.
pub const ASSET_URL_PREFIX: &str = "https://";

/// What the batch should do next with a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Submit a new job, then wait for it and download the asset.
    Submit,
    /// A job is in flight: wait for it, then download.
    AwaitAndDownload,
    /// The job is done and the asset URL is known: download only.
    DownloadOnly,
    /// Nothing to do.
    Skip,
}

/// Map a raw status cell to the next action.
///
/// Case-sensitive and total: every string lands in exactly one action.
pub fn classify(raw: &str) -> Action {
    match raw {
        "" | STATUS_PENDING | STATUS_ERROR => Action::Submit,
        STATUS_IN_PROGRESS => Action::AwaitAndDownload,
        s if s.starts_with(ASSET_URL_PREFIX) => Action::DownloadOnly,
        _ => Action::Skip,
    }
}

/// Which of the three "no active job" spellings a row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubmittedMarker {
    Empty,
    Pending,
    Error,
}

impl UnsubmittedMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Pending => STATUS_PENDING,
            Self::Error => STATUS_ERROR,
        }
    }
}

/// Typed view of a row's status/job-id cell pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    /// No active job.
    Unsubmitted(UnsubmittedMarker),
    /// Job submitted and not yet complete.
    InProgress { job_id: String },
    /// Job complete; the asset can be fetched from `url`.
    Ready { url: String },
    /// Finished or frozen. Usually the local path of the downloaded asset.
    Terminal { value: String },
}

impl RowStatus {
    /// A row that failed and should be resubmitted by a later run.
    pub fn failed() -> Self {
        Self::Unsubmitted(UnsubmittedMarker::Error)
    }

    /// Build the typed status from the raw cells.
    ///
    /// An `in_progress` cell with no job id yields `InProgress` with an empty
    /// job id; callers check [`RowStatus::job_id`] before polling.
    pub fn from_cells(status: &str, job_id: &str) -> Self {
        match status {
            "" => Self::Unsubmitted(UnsubmittedMarker::Empty),
            STATUS_PENDING => Self::Unsubmitted(UnsubmittedMarker::Pending),
            STATUS_ERROR => Self::Unsubmitted(UnsubmittedMarker::Error),
            STATUS_IN_PROGRESS => Self::InProgress {
                job_id: job_id.to_string(),
            },
            s if s.starts_with(ASSET_URL_PREFIX) => Self::Ready { url: s.to_string() },
            s => Self::Terminal {
                value: s.to_string(),
            },
        }
    }

    /// The string written back into the status cell.
    pub fn encode(&self) -> &str {
        match self {
            Self::Unsubmitted(marker) => marker.as_str(),
            Self::InProgress { .. } => STATUS_IN_PROGRESS,
            Self::Ready { url } => url,
            Self::Terminal { value } => value,
        }
    }

    /// Job id carried by this status, if any and non-empty.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::InProgress { job_id } if !job_id.is_empty() => Some(job_id),
            _ => None,
        }
    }

    pub fn action(&self) -> Action {
        classify(self.encode())
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsubmitted(UnsubmittedMarker::Empty) => write!(f, "unsubmitted"),
            Self::Unsubmitted(marker) => write!(f, "{}", marker.as_str()),
            Self::InProgress { job_id } => write!(f, "in_progress({})", job_id),
            Self::Ready { url } => write!(f, "ready({})", url),
            Self::Terminal { value } => write!(f, "terminal({})", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literal_cases() {
        assert_eq!(classify(""), Action::Submit);
        assert_eq!(classify("pending"), Action::Submit);
        assert_eq!(classify("error"), Action::Submit);
        assert_eq!(classify("in_progress"), Action::AwaitAndDownload);
        assert_eq!(classify("https://cdn.example/a.mp3"), Action::DownloadOnly);
        assert_eq!(classify("./audio_files/es-co/42.mp3"), Action::Skip);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify("Pending"), Action::Skip);
        assert_eq!(classify("ERROR"), Action::Skip);
        assert_eq!(classify("IN_PROGRESS"), Action::Skip);
        assert_eq!(classify("HTTPS://cdn.example/a.mp3"), Action::Skip);
    }

    #[test]
    fn test_classify_near_misses_skip() {
        assert_eq!(classify(" pending"), Action::Skip);
        assert_eq!(classify("in_progress "), Action::Skip);
        assert_eq!(classify("http://cdn.example/a.mp3"), Action::Skip);
        assert_eq!(classify("https:/"), Action::Skip);
        assert_eq!(classify("done"), Action::Skip);
    }

    #[test]
    fn test_classify_is_pure() {
        for raw in ["", "pending", "error", "in_progress", "https://x/y", "frozen"] {
            assert_eq!(classify(raw), classify(raw));
        }
    }

    #[test]
    fn test_from_cells_preserves_encoding() {
        for raw in [
            "",
            "pending",
            "error",
            "in_progress",
            "https://cdn.example/a.mp3",
            "audio_files/de/7.mp3",
        ] {
            let status = RowStatus::from_cells(raw, "job-1");
            assert_eq!(status.encode(), raw);
            assert_eq!(status.action(), classify(raw));
        }
    }

    #[test]
    fn test_job_id_only_for_in_progress() {
        let status = RowStatus::from_cells("in_progress", "J");
        assert_eq!(status.job_id(), Some("J"));

        let missing = RowStatus::from_cells("in_progress", "");
        assert_eq!(missing.job_id(), None);

        let ready = RowStatus::from_cells("https://host/a.mp3", "J");
        assert_eq!(ready.job_id(), None);
    }

    #[test]
    fn test_failed_encodes_as_error() {
        assert_eq!(RowStatus::failed().encode(), "error");
        assert_eq!(RowStatus::failed().action(), Action::Submit);
    }
}
