use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - API base URL is http(s)
/// - Rate limit and poll interval are non-zero
/// - Audio extension and item id column are set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = &config.api.base_url;
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    if config.batch.rate_limit_per_minute == 0 {
        return Err(ConfigError::ValidationError(
            "batch.rate_limit_per_minute cannot be 0".to_string(),
        ));
    }

    if config.batch.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "batch.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    if config.batch.max_poll_attempts == Some(0) {
        return Err(ConfigError::ValidationError(
            "batch.max_poll_attempts cannot be 0".to_string(),
        ));
    }

    let extension = config.storage.audio_extension.trim_start_matches('.');
    if extension.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.audio_extension cannot be empty".to_string(),
        ));
    }

    if config.storage.item_id_column.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.item_id_column cannot be empty".to_string(),
        ));
    }

    Ok(())
}
