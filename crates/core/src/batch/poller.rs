//! Waiting for a submitted job to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::status::ASSET_URL_PREFIX;
use crate::throttle::Throttle;
use crate::tts_client::{JobStatus, TtsClient};

use super::RowError;

/// Poll budget for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Fixed delay between two status checks.
    pub interval: Duration,
    /// Give up once waiting longer than this. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Give up after this many status checks.
    pub max_attempts: Option<u32>,
}

/// Polls a job until it is ready, failed, or out of budget.
pub struct JobPoller {
    client: Arc<dyn TtsClient>,
    throttle: Arc<Throttle>,
    settings: PollSettings,
}

impl JobPoller {
    pub fn new(client: Arc<dyn TtsClient>, throttle: Arc<Throttle>, settings: PollSettings) -> Self {
        Self {
            client,
            throttle,
            settings,
        }
    }

    /// Wait for `job_id` and return its asset URL.
    ///
    /// An explicit failure from the vendor, or a finished job whose asset URL
    /// is not `https://`, fails the job. Transient errors are logged and the
    /// job is checked again; any other error gives up on the job for this run.
    pub async fn await_ready(&self, job_id: &str) -> Result<String, RowError> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            self.throttle.acquire().await;
            attempts += 1;

            match self.client.poll(job_id).await {
                Ok(JobStatus::Ready { url }) if url.starts_with(ASSET_URL_PREFIX) => {
                    debug!("Job {} ready after {} checks", job_id, attempts);
                    return Ok(url);
                }
                Ok(JobStatus::Ready { url }) => {
                    warn!("Job {} finished with unusable asset URL {}", job_id, url);
                    return Err(RowError::TranscriptionFailed {
                        job_id: job_id.to_string(),
                        message: format!("asset URL '{}' is not {}", url, ASSET_URL_PREFIX),
                    });
                }
                Ok(JobStatus::Failed { message }) => {
                    warn!("Job {} failed: {}", job_id, message);
                    return Err(RowError::TranscriptionFailed {
                        job_id: job_id.to_string(),
                        message,
                    });
                }
                Ok(status) => {
                    debug!("Job {} still running ({:?})", job_id, status);
                }
                Err(e) if e.is_transient() => {
                    warn!("Status check for job {} failed: {}", job_id, e);
                }
                Err(e) => {
                    warn!("Status check for job {} failed, not retrying: {}", job_id, e);
                    return Err(RowError::PollFailed {
                        job_id: job_id.to_string(),
                        source: e,
                    });
                }
            }

            if self.out_of_budget(attempts, started.elapsed()) {
                let waited = started.elapsed();
                warn!(
                    "Giving up on job {} after {} checks over {:?}",
                    job_id, attempts, waited
                );
                return Err(RowError::PollTimeout {
                    job_id: job_id.to_string(),
                    attempts,
                    waited,
                });
            }

            sleep(self.settings.interval).await;
        }
    }

    /// True when another wait-and-check would exceed the budget.
    fn out_of_budget(&self, attempts: u32, elapsed: Duration) -> bool {
        if let Some(max) = self.settings.max_attempts {
            if attempts >= max {
                return true;
            }
        }
        match self.settings.timeout {
            Some(timeout) => elapsed + self.settings.interval > timeout,
            None => false,
        }
    }
}
