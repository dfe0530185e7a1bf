//! Play.ht v1 API client.
//!
//! Jobs are created with `POST /convert` and tracked with
//! `GET /articleStatus?transcriptionId=...`. Finished jobs expose an
//! `audioUrl` that is downloaded with a plain GET.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Credentials;

use super::{JobStatus, SynthesisRequest, TtsClient, TtsClientError};

/// Title attached to every submitted job.
const JOB_TITLE: &str = "Individual Audio";

/// Play.ht client configuration.
#[derive(Debug, Clone)]
pub struct PlayHtConfig {
    /// API base URL, e.g. `https://api.play.ht/api/v1`.
    pub base_url: String,
    pub credentials: Credentials,
    pub request_timeout_secs: u64,
}

/// Play.ht client implementation.
pub struct PlayHtClient {
    client: Client,
    config: PlayHtConfig,
}

impl PlayHtClient {
    /// Create a new Play.ht client.
    pub fn new(config: PlayHtConfig) -> Result<Self, TtsClientError> {
        if config.credentials.user_id.is_empty() || config.credentials.api_key.is_empty() {
            return Err(TtsClientError::NotConfigured(
                "Play.ht user id and API key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Authorization", &self.config.credentials.api_key)
            .header("X-USER-ID", &self.config.credentials.user_id)
            .header("Accept", "application/json")
    }
}

/// Map non-success responses to errors, passing successful ones through.
async fn check_status(response: Response) -> Result<Response, TtsClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 429 {
        return Err(TtsClientError::RateLimitExceeded);
    }
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(TtsClientError::NotConfigured(
            "Play.ht rejected the credentials".to_string(),
        ));
    }

    let body = response.text().await.unwrap_or_default();
    Err(TtsClientError::ApiError {
        status: status.as_u16(),
        message: body.chars().take(200).collect(),
    })
}

#[async_trait]
impl TtsClient for PlayHtClient {
    fn name(&self) -> &str {
        "playht"
    }

    async fn submit(&self, request: &SynthesisRequest) -> Result<String, TtsClientError> {
        let url = format!("{}/convert", self.base_url());
        debug!(
            "Play.ht convert: voice={}, lang={}, chars={}",
            request.voice,
            request.lang_code,
            request.text.chars().count()
        );

        let body = ConvertRequest::from(request);
        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let result: ConvertResponse = response.json().await.map_err(|e| {
            TtsClientError::ParseError(format!("Failed to parse convert response: {}", e))
        })?;
        result.into_job_id()
    }

    async fn poll(&self, job_id: &str) -> Result<JobStatus, TtsClientError> {
        let url = format!("{}/articleStatus", self.base_url());
        debug!("Play.ht status: transcriptionId={}", job_id);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("transcriptionId", job_id)])
            .send()
            .await?;
        let response = check_status(response).await?;

        let result: ArticleStatusResponse = response.json().await.map_err(|e| {
            TtsClientError::ParseError(format!("Failed to parse status response: {}", e))
        })?;
        Ok(result.into())
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TtsClientError> {
        debug!("Play.ht fetch: {}", url);

        let response = self.client.get(url).send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertRequest<'a> {
    content: [&'a str; 1],
    voice: &'a str,
    title: &'a str,
    trim_silence: bool,
}

impl<'a> From<&'a SynthesisRequest> for ConvertRequest<'a> {
    fn from(request: &'a SynthesisRequest) -> Self {
        Self {
            content: [request.text.as_str()],
            voice: &request.voice,
            title: JOB_TITLE,
            trim_silence: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertResponse {
    #[serde(default)]
    transcription_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ConvertResponse {
    fn into_job_id(self) -> Result<String, TtsClientError> {
        match self.transcription_id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(TtsClientError::ParseError(format!(
                "convert response carried no transcriptionId (error: {})",
                self.error.unwrap_or_else(|| "none".to_string())
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleStatusResponse {
    #[serde(default)]
    converted: bool,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    error_message: Option<String>,
}

impl From<ArticleStatusResponse> for JobStatus {
    fn from(response: ArticleStatusResponse) -> Self {
        if response.error {
            return JobStatus::Failed {
                message: response
                    .error_message
                    .unwrap_or_else(|| "unspecified error".to_string()),
            };
        }
        match response.audio_url {
            Some(url) if response.converted && !url.is_empty() => JobStatus::Ready { url },
            _ => JobStatus::InProgress,
        }
    }
}
