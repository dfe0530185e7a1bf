//! The `(lang_code, voice)` pair a run works on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language code plus vendor voice. Scopes the status and job-id columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Locale code; also the name of the column holding the text to speak.
    pub lang_code: String,
    /// Vendor voice identifier, e.g. `es-CO-SalomeNeural`.
    pub voice: String,
}

impl Target {
    pub fn new(lang_code: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            lang_code: lang_code.into(),
            voice: voice.into(),
        }
    }

    /// Column holding the text to synthesize.
    pub fn text_column(&self) -> &str {
        &self.lang_code
    }

    /// `tts_{lang_code}_{voice}_status`
    pub fn status_column(&self) -> String {
        self.column("status")
    }

    /// `tts_{lang_code}_{voice}_tx_id`
    pub fn tx_id_column(&self) -> String {
        self.column("tx_id")
    }

    fn column(&self, suffix: &str) -> String {
        format!("tts_{}_{}_{}", self.lang_code, self.voice, suffix)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.lang_code, self.voice)
    }
}
