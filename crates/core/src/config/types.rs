use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// TTS vendor API configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Account identifier. Usually supplied through the environment instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            user_id: None,
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.play.ht/api/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Batch pacing and polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Outbound calls allowed per minute, across submit, poll and download.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Delay between two status checks of the same job (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Give up waiting for a job after this many seconds (0 = wait forever).
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Optional cap on status checks per job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,

    /// Persist the dataset after every row whose state changed.
    #[serde(default = "default_checkpoint")]
    pub checkpoint_each_row: bool,
}

impl BatchConfig {
    /// Minimum spacing between the starts of two outbound calls.
    pub fn min_call_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.rate_limit_per_minute.max(1) as f64)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        match self.poll_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: default_rate_limit(),
            poll_interval_ms: default_poll_interval(),
            poll_timeout_secs: default_poll_timeout(),
            max_poll_attempts: None,
            checkpoint_each_row: default_checkpoint(),
        }
    }
}

fn default_rate_limit() -> u32 {
    50
}

fn default_poll_interval() -> u64 {
    2000 // 2 seconds
}

fn default_poll_timeout() -> u64 {
    600 // 10 minutes
}

fn default_checkpoint() -> bool {
    true
}

/// Local storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,
    #[serde(default = "default_item_id_column")]
    pub item_id_column: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            audio_extension: default_audio_extension(),
            item_id_column: default_item_id_column(),
        }
    }
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("./audio_files")
}

fn default_audio_extension() -> String {
    "mp3".to_string()
}

fn default_item_id_column() -> String {
    "item_id".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.play.ht/api/v1");
        assert_eq!(config.batch.rate_limit_per_minute, 50);
        assert_eq!(config.batch.poll_interval_ms, 2000);
        assert_eq!(config.batch.poll_timeout_secs, 600);
        assert!(config.batch.checkpoint_each_row);
        assert_eq!(config.storage.audio_dir, PathBuf::from("./audio_files"));
        assert_eq!(config.storage.audio_extension, "mp3");
        assert_eq!(config.storage.item_id_column, "item_id");
    }

    #[test]
    fn test_min_call_interval() {
        let mut batch = BatchConfig::default();
        assert_eq!(batch.min_call_interval(), Duration::from_millis(1200));

        batch.rate_limit_per_minute = 60;
        assert_eq!(batch.min_call_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_poll_timeout_zero_is_unbounded() {
        let batch = BatchConfig {
            poll_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(batch.poll_timeout(), None);

        let batch = BatchConfig::default();
        assert_eq!(batch.poll_timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_api_key_never_serialized() {
        let config = Config {
            api: ApiConfig {
                api_key: Some("secret".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("secret"));
    }
}
