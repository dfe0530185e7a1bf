//! Mock TTS client for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::tts_client::{JobStatus, SynthesisRequest, TtsClient, TtsClientError};

/// Bytes returned by `fetch` for any URL without a configured asset.
pub const DEFAULT_AUDIO: &[u8] = b"ID3mock-audio";

/// A recorded client call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedTtsCall {
    Submit { request: SynthesisRequest },
    Poll { job_id: String },
    Fetch { url: String },
}

/// Mock implementation of the TtsClient trait.
///
/// Provides controllable behavior for testing:
/// - Job ids are handed out as `job-1`, `job-2`, ...
/// - Polls answer `Ready` with `https://mock.tts/{job_id}.mp3` unless scripted
/// - Fetches return [`DEFAULT_AUDIO`] unless an asset is configured
/// - Every call is recorded with the instant it started, failures included
///
/// # Example
///
/// ```rust,ignore
/// use voicebatch_core::testing::MockTtsClient;
///
/// let client = MockTtsClient::new();
/// client.fail_submission_for("broken text").await;
/// client
///     .script_poll("job-1", vec![JobStatus::InProgress, JobStatus::Failed { message: "x".into() }])
///     .await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTtsClient {
    /// Recorded calls with their start instant.
    calls: Arc<RwLock<Vec<(Instant, RecordedTtsCall)>>>,
    /// Counter for generated job ids.
    job_counter: Arc<AtomicU64>,
    /// Texts whose submission fails.
    failing_texts: Arc<RwLock<HashSet<String>>>,
    /// Scripted poll answers per job. The last answer repeats.
    poll_scripts: Arc<RwLock<HashMap<String, VecDeque<Result<JobStatus, TtsClientError>>>>>,
    /// Asset bytes per URL.
    assets: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// URLs whose download fails.
    failing_urls: Arc<RwLock<HashSet<String>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TtsClientError>>>,
}

impl MockTtsClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// URL the mock reports for a finished job.
    pub fn asset_url(job_id: &str) -> String {
        format!("https://mock.tts/{}.mp3", job_id)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Make every submission with this exact text fail.
    pub async fn fail_submission_for(&self, text: &str) {
        self.failing_texts.write().await.insert(text.to_string());
    }

    /// Script the answers for polls of `job_id`, returned in order.
    pub async fn script_poll(&self, job_id: &str, statuses: Vec<JobStatus>) {
        self.script_poll_results(job_id, statuses.into_iter().map(Ok).collect())
            .await;
    }

    /// Script poll answers including transport errors.
    pub async fn script_poll_results(
        &self,
        job_id: &str,
        results: Vec<Result<JobStatus, TtsClientError>>,
    ) {
        self.poll_scripts
            .write()
            .await
            .insert(job_id.to_string(), results.into());
    }

    /// Serve these bytes for `url`.
    pub async fn set_asset(&self, url: &str, bytes: Vec<u8>) {
        self.assets.write().await.insert(url.to_string(), bytes);
    }

    /// Make every download of `url` fail.
    pub async fn fail_fetch_for(&self, url: &str) {
        self.failing_urls.write().await.insert(url.to_string());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TtsClientError) {
        *self.next_error.write().await = Some(error);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls in order.
    pub async fn recorded_calls(&self) -> Vec<RecordedTtsCall> {
        self.calls
            .read()
            .await
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Start instants of all recorded calls, in order.
    pub async fn call_instants(&self) -> Vec<Instant> {
        self.calls.read().await.iter().map(|(at, _)| *at).collect()
    }

    pub async fn submit_count(&self) -> usize {
        self.count(|c| matches!(c, RecordedTtsCall::Submit { .. }))
            .await
    }

    pub async fn poll_count(&self) -> usize {
        self.count(|c| matches!(c, RecordedTtsCall::Poll { .. })).await
    }

    pub async fn fetch_count(&self) -> usize {
        self.count(|c| matches!(c, RecordedTtsCall::Fetch { .. })).await
    }

    /// Texts submitted so far, in order.
    pub async fn submitted_texts(&self) -> Vec<String> {
        self.recorded_calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                RecordedTtsCall::Submit { request } => Some(request.text),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    async fn count(&self, predicate: impl Fn(&RecordedTtsCall) -> bool) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|(_, call)| predicate(call))
            .count()
    }

    async fn record(&self, call: RecordedTtsCall) {
        self.calls.write().await.push((Instant::now(), call));
    }

    async fn take_error(&self) -> Option<TtsClientError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl TtsClient for MockTtsClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, request: &SynthesisRequest) -> Result<String, TtsClientError> {
        self.record(RecordedTtsCall::Submit {
            request: request.clone(),
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if self.failing_texts.read().await.contains(&request.text) {
            return Err(TtsClientError::ApiError {
                status: 500,
                message: "mock submission failure".to_string(),
            });
        }

        let n = self.job_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("job-{}", n))
    }

    async fn poll(&self, job_id: &str) -> Result<JobStatus, TtsClientError> {
        self.record(RecordedTtsCall::Poll {
            job_id: job_id.to_string(),
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let mut scripts = self.poll_scripts.write().await;
        match scripts.get_mut(job_id) {
            Some(script) if script.len() > 1 => script
                .pop_front()
                .unwrap_or(Ok(JobStatus::InProgress)),
            Some(script) => match script.front() {
                Some(Ok(status)) => Ok(status.clone()),
                Some(Err(_)) => script.pop_front().unwrap_or(Ok(JobStatus::InProgress)),
                None => Ok(JobStatus::InProgress),
            },
            None => Ok(JobStatus::Ready {
                url: Self::asset_url(job_id),
            }),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TtsClientError> {
        self.record(RecordedTtsCall::Fetch {
            url: url.to_string(),
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if self.failing_urls.read().await.contains(url) {
            return Err(TtsClientError::ConnectionFailed(
                "mock download failure".to_string(),
            ));
        }

        Ok(self
            .assets
            .read()
            .await
            .get(url)
            .cloned()
            .unwrap_or_else(|| DEFAULT_AUDIO.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            lang_code: "en".to_string(),
            voice: "Aria".to_string(),
        }
    }

    #[tokio::test]
    async fn test_job_ids_are_sequential() {
        let client = MockTtsClient::new();
        assert_eq!(client.submit(&request("a")).await.unwrap(), "job-1");
        assert_eq!(client.submit(&request("b")).await.unwrap(), "job-2");
        assert_eq!(client.submitted_texts().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_submission_failure_is_recorded() {
        let client = MockTtsClient::new();
        client.fail_submission_for("bad").await;
        assert!(client.submit(&request("bad")).await.is_err());
        assert_eq!(client.submit_count().await, 1);
    }

    #[tokio::test]
    async fn test_poll_script_last_answer_repeats() {
        let client = MockTtsClient::new();
        client
            .script_poll("J", vec![JobStatus::Pending, JobStatus::InProgress])
            .await;

        assert_eq!(client.poll("J").await.unwrap(), JobStatus::Pending);
        assert_eq!(client.poll("J").await.unwrap(), JobStatus::InProgress);
        assert_eq!(client.poll("J").await.unwrap(), JobStatus::InProgress);
    }

    #[tokio::test]
    async fn test_unscripted_poll_is_ready() {
        let client = MockTtsClient::new();
        assert_eq!(
            client.poll("job-9").await.unwrap(),
            JobStatus::Ready {
                url: "https://mock.tts/job-9.mp3".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_assets_and_failures() {
        let client = MockTtsClient::new();
        client.set_asset("https://a/1.mp3", vec![1, 2, 3]).await;
        client.fail_fetch_for("https://a/2.mp3").await;

        assert_eq!(client.fetch("https://a/1.mp3").await.unwrap(), vec![1, 2, 3]);
        assert!(client.fetch("https://a/2.mp3").await.is_err());
        assert_eq!(
            client.fetch("https://a/3.mp3").await.unwrap(),
            DEFAULT_AUDIO.to_vec()
        );
        assert_eq!(client.fetch_count().await, 3);
    }

    #[tokio::test]
    async fn test_next_error_is_consumed() {
        let client = MockTtsClient::new();
        client.set_next_error(TtsClientError::Timeout).await;
        assert!(client.poll("J").await.is_err());
        assert!(client.poll("J").await.is_ok());
    }
}
