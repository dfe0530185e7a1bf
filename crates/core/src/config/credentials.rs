//! Vendor credential resolution.

use std::fmt;

use super::{types::ApiConfig, ConfigError};

/// Environment variable holding the account identifier.
pub const USER_ID_ENV: &str = "PLAY_DOT_HT_USER_ID";

/// Environment variable holding the secret API key.
pub const API_KEY_ENV: &str = "PLAY_DOT_HT_API_KEY";

/// Account identifier plus secret key for the TTS vendor.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Resolve credentials: explicit values first, then the environment, then the config file.
pub fn resolve_credentials(
    user_id: Option<&str>,
    api_key: Option<&str>,
    api: &ApiConfig,
) -> Result<Credentials, ConfigError> {
    let user_id = pick(user_id, USER_ID_ENV, api.user_id.as_deref())
        .ok_or_else(|| ConfigError::MissingCredential(USER_ID_ENV.to_string()))?;
    let api_key = pick(api_key, API_KEY_ENV, api.api_key.as_deref())
        .ok_or_else(|| ConfigError::MissingCredential(API_KEY_ENV.to_string()))?;

    Ok(Credentials { user_id, api_key })
}

fn pick(explicit: Option<&str>, env_var: &str, configured: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .or_else(|| configured.map(str::to_string))
        .filter(|value| !value.trim().is_empty())
}
