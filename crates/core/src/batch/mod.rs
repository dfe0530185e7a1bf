//! Resumable per-row TTS batch.
//!
//! The driver walks the dataset in order and, for each row, classifies the
//! persisted status and runs the matching steps:
//! - **Submit**: submit a job, then fall through to polling and download
//! - **AwaitAndDownload**: poll the recorded job, then download
//! - **DownloadOnly**: download the recorded asset URL
//! - **Skip**: nothing
//!
//! Row failures are recorded in the row and never abort the run.

mod driver;
mod error;
mod fetcher;
mod poller;
mod submitter;
mod types;
mod writer;

pub use driver::BatchDriver;
pub use error::RowError;
pub use fetcher::{AssetFetcher, FetchedAsset};
pub use poller::{JobPoller, PollSettings};
pub use submitter::JobSubmitter;
pub use types::{BatchReport, BatchSettings, RowOutcome};
pub use writer::RowStateWriter;
