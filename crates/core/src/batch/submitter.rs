//! Job submission.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::dataset::Row;
use crate::target::Target;
use crate::throttle::Throttle;
use crate::tts_client::{SynthesisRequest, TtsClient};

use super::RowError;

/// Requests a new TTS job for a row that has none.
pub struct JobSubmitter {
    client: Arc<dyn TtsClient>,
    throttle: Arc<Throttle>,
}

impl JobSubmitter {
    pub fn new(client: Arc<dyn TtsClient>, throttle: Arc<Throttle>) -> Self {
        Self { client, throttle }
    }

    /// Submit `row`'s text for `target` and return the new job id.
    ///
    /// Rows without an item id or without text are refused before any
    /// request is made.
    pub async fn submit(&self, row: &Row, target: &Target) -> Result<String, RowError> {
        if row.item_id.trim().is_empty() {
            return Err(RowError::EmptyItemId { row: row.index });
        }
        if row.text.trim().is_empty() {
            return Err(RowError::EmptyText {
                item_id: row.item_id.clone(),
            });
        }

        let request = SynthesisRequest {
            text: row.text.clone(),
            lang_code: target.lang_code.clone(),
            voice: target.voice.clone(),
        };

        self.throttle.acquire().await;
        match self.client.submit(&request).await {
            Ok(job_id) => {
                debug!("Submitted item {} as job {}", row.item_id, job_id);
                Ok(job_id)
            }
            Err(e) => {
                warn!("Submission failed for item {}: {}", row.item_id, e);
                Err(RowError::SubmissionFailed {
                    item_id: row.item_id.clone(),
                    source: e,
                })
            }
        }
    }
}
