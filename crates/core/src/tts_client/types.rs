//! Types for TTS client operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the TTS vendor.
#[derive(Debug, Error)]
pub enum TtsClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl TtsClientError {
    /// Whether a later attempt at the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout | Self::RateLimitExceeded => true,
            Self::ApiError { status, .. } => *status >= 500,
            Self::ParseError(_) | Self::NotConfigured(_) => false,
        }
    }
}

impl From<reqwest::Error> for TtsClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TtsClientError::Timeout
        } else if e.is_decode() {
            TtsClientError::ParseError(e.to_string())
        } else {
            TtsClientError::ConnectionFailed(e.to_string())
        }
    }
}

/// One synthesis job to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to speak. Never empty.
    pub text: String,
    /// Locale code of the text.
    pub lang_code: String,
    /// Vendor voice identifier.
    pub voice: String,
}

/// Status of a submitted job as reported by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted but not started.
    Pending,
    /// Being synthesized.
    InProgress,
    /// Finished; the asset can be downloaded from `url`.
    Ready { url: String },
    /// The vendor gave up on the job.
    Failed { message: String },
}

/// Trait for TTS vendor backends.
///
/// Credentials are bound when the client is constructed.
#[async_trait]
pub trait TtsClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Submit a synthesis job and return its opaque id.
    async fn submit(&self, request: &SynthesisRequest) -> Result<String, TtsClientError>;

    /// Check the status of a submitted job.
    async fn poll(&self, job_id: &str) -> Result<JobStatus, TtsClientError>;

    /// Download a finished asset.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TtsClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(TtsClientError::Timeout.is_transient());
        assert!(TtsClientError::ConnectionFailed("reset".to_string()).is_transient());
        assert!(TtsClientError::ApiError {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!TtsClientError::ApiError {
            status: 400,
            message: String::new()
        }
        .is_transient());
        assert!(!TtsClientError::ParseError("eof".to_string()).is_transient());
    }
}
