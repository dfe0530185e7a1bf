//! Testing utilities and mock implementations.
//!
//! This module provides a mock TTS client and an in-memory dataset store so the
//! whole batch can be exercised without network or filesystem.
//!
//! # Example
//!
//! ```rust,ignore
//! use voicebatch_core::testing::{fixtures, MemoryDatasetStore, MockTtsClient};
//!
//! let client = MockTtsClient::new();
//! let store = MemoryDatasetStore::new(fixtures::dataset("es-CO", &[("1", "Hola")]));
//!
//! // Configure mock responses
//! client.fail_submission_for("Hola").await;
//! ```

mod memory_store;
mod mock_tts_client;

pub use memory_store::MemoryDatasetStore;
pub use mock_tts_client::{MockTtsClient, RecordedTtsCall, DEFAULT_AUDIO};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;
    use std::time::Duration;

    use crate::batch::{BatchSettings, PollSettings};
    use crate::dataset::Dataset;
    use crate::target::Target;

    /// Dataset with an `item_id` column and one text column named `lang_code`.
    pub fn dataset(lang_code: &str, rows: &[(&str, &str)]) -> Dataset {
        Dataset::new(
            vec!["item_id".to_string(), lang_code.to_string()],
            rows.iter()
                .map(|(id, text)| vec![id.to_string(), text.to_string()])
                .collect(),
        )
    }

    /// Spanish (Colombia) target with a typical vendor voice.
    pub fn target() -> Target {
        Target::new("es-CO", "es-CO-SalomeNeural")
    }

    /// Settings with no throttling and millisecond polling, writing audio under `audio_dir`.
    pub fn fast_settings(audio_dir: &Path) -> BatchSettings {
        BatchSettings {
            item_id_column: "item_id".to_string(),
            audio_dir: audio_dir.to_path_buf(),
            audio_extension: "mp3".to_string(),
            min_call_interval: Duration::ZERO,
            poll: PollSettings {
                interval: Duration::from_millis(1),
                timeout: Some(Duration::from_secs(5)),
                max_attempts: Some(20),
            },
            checkpoint_each_row: true,
        }
    }
}
