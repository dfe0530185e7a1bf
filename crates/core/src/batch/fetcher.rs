//! Asset download to the local audio tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, warn};

use crate::throttle::Throttle;
use crate::tts_client::TtsClient;

use super::RowError;

/// Result of materializing an asset locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub path: PathBuf,
    /// False when the file already existed and nothing was transferred.
    pub downloaded: bool,
}

/// Downloads finished assets to `{audio_dir}/{lang_code}/{item_id}.{ext}`.
pub struct AssetFetcher {
    client: Arc<dyn TtsClient>,
    throttle: Arc<Throttle>,
    audio_dir: PathBuf,
    extension: String,
}

impl AssetFetcher {
    pub fn new(
        client: Arc<dyn TtsClient>,
        throttle: Arc<Throttle>,
        audio_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            client,
            throttle,
            audio_dir: audio_dir.into(),
            extension: extension.into(),
        }
    }

    /// Deterministic local path for an item.
    ///
    /// Path separators in the item id are replaced so the file always lands
    /// directly inside the language directory.
    pub fn local_path(&self, lang_code: &str, item_id: &str) -> PathBuf {
        let file_stem: String = item_id
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.audio_dir
            .join(lang_code)
            .join(format!("{}.{}", file_stem, self.extension))
    }

    /// Make sure the asset at `url` is on disk for `item_id`.
    ///
    /// An existing file is reused without any network call.
    pub async fn fetch(
        &self,
        url: &str,
        lang_code: &str,
        item_id: &str,
    ) -> Result<FetchedAsset, RowError> {
        if item_id.trim().is_empty() {
            return Err(RowError::download_failed(url, "row has no item id"));
        }

        let path = self.local_path(lang_code, item_id);
        let exists = match fs::try_exists(&path).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Cannot check {}, downloading again: {}", path.display(), e);
                false
            }
        };
        if exists {
            debug!("Asset for item {} already at {}", item_id, path.display());
            return Ok(FetchedAsset {
                path,
                downloaded: false,
            });
        }

        self.throttle.acquire().await;
        let bytes = self
            .client
            .fetch(url)
            .await
            .map_err(|e| RowError::download_failed(url, e))?;

        write_atomically(&path, &bytes)
            .await
            .map_err(|e| RowError::download_failed(url, e))?;

        debug!(
            "Downloaded {} bytes for item {} to {}",
            bytes.len(),
            item_id,
            path.display()
        );
        Ok(FetchedAsset {
            path,
            downloaded: true,
        })
    }
}

/// Write through a sibling temp file so a crash never leaves a truncated asset
/// at the final path (which would be taken as complete on the next run).
async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".part");
    let staging = PathBuf::from(staging);

    if let Err(e) = fs::write(&staging, bytes).await {
        let _ = fs::remove_file(&staging).await;
        return Err(e);
    }
    if let Err(e) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(e);
    }
    Ok(())
}
