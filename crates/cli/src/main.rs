use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voicebatch_core::{
    load_config, load_default_config, resolve_credentials, resolve_destination, validate_config,
    BatchDriver, BatchSettings, Config, CsvDatasetStore, PlayHtClient, PlayHtConfig, Target,
};

/// Convert one text column of a CSV dataset to audio with a TTS voice.
///
/// Progress is stored in the dataset itself, so an interrupted run can be
/// resumed by running again on the written snapshot.
#[derive(Debug, Parser)]
#[command(name = "voicebatch", version, about)]
struct Args {
    /// Dataset to process.
    #[arg(value_name = "CSV")]
    input: PathBuf,

    /// Language code; also the name of the text column.
    lang_code: String,

    /// Vendor voice name.
    voice: String,

    /// Account id (falls back to PLAY_DOT_HT_USER_ID).
    #[arg(long)]
    user_id: Option<String>,

    /// API key (falls back to PLAY_DOT_HT_API_KEY).
    #[arg(long)]
    api_key: Option<String>,

    /// Where to write the snapshot.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Write progress back into the input file.
    #[arg(long)]
    overwrite_input: bool,

    #[arg(long, value_name = "COLUMN")]
    item_id_column: Option<String>,

    #[arg(long, value_name = "DIR")]
    audio_dir: Option<PathBuf>,

    #[arg(long, value_name = "EXT")]
    audio_extension: Option<String>,

    #[arg(long, value_name = "N")]
    rate_limit_per_minute: Option<u32>,

    /// Give up polling a job after this long; 0 waits forever.
    #[arg(long, value_name = "SECS")]
    poll_timeout_secs: Option<u64>,

    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log as JSON lines.
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Flags take precedence over the file and environment layers.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(column) = &self.item_id_column {
            config.storage.item_id_column = column.clone();
        }
        if let Some(dir) = &self.audio_dir {
            config.storage.audio_dir = dir.clone();
        }
        if let Some(extension) = &self.audio_extension {
            config.storage.audio_extension = extension.clone();
        }
        if let Some(rpm) = self.rate_limit_per_minute {
            config.batch.rate_limit_per_minute = rpm;
        }
        if let Some(secs) = self.poll_timeout_secs {
            config.batch.poll_timeout_secs = secs;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    init_logging(args.log_json);

    if let Err(e) = run(args).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_default_config().context("Failed to load configuration")?,
    };
    args.apply_overrides(&mut config);
    validate_config(&config).context("Configuration validation failed")?;

    let credentials = resolve_credentials(
        args.user_id.as_deref(),
        args.api_key.as_deref(),
        &config.api,
    )
    .context("Credentials are required")?;

    let destination = resolve_destination(
        &args.input,
        args.output.as_deref(),
        args.overwrite_input,
        &credentials.user_id,
        Utc::now(),
    )
    .context("Cannot determine where to save the dataset")?;

    let client = PlayHtClient::new(PlayHtConfig {
        base_url: config.api.base_url.clone(),
        credentials,
        request_timeout_secs: config.api.request_timeout_secs,
    })
    .context("Failed to create TTS client")?;

    let store = CsvDatasetStore::new(&args.input, destination);
    let target = Target::new(args.lang_code, args.voice);
    let driver = BatchDriver::new(
        BatchSettings::from_config(&config),
        target,
        Arc::new(client),
        Arc::new(store),
    );

    let report = driver.run().await.context("Batch aborted")?;

    println!("{}", report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["voicebatch", "data.csv", "es-CO", "Salome"]).unwrap();
        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.lang_code, "es-CO");
        assert_eq!(args.voice, "Salome");
        assert!(!args.overwrite_input);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_missing_voice_is_rejected() {
        assert!(Args::try_parse_from(["voicebatch", "data.csv", "es-CO"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "voicebatch",
            "data.csv",
            "es-CO",
            "Salome",
            "--item-id-column",
            "id",
            "--audio-dir",
            "/tmp/audio",
            "--audio-extension",
            "wav",
            "--rate-limit-per-minute",
            "10",
            "--poll-timeout-secs",
            "0",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.storage.item_id_column, "id");
        assert_eq!(config.storage.audio_dir, PathBuf::from("/tmp/audio"));
        assert_eq!(config.storage.audio_extension, "wav");
        assert_eq!(config.batch.rate_limit_per_minute, 10);
        assert_eq!(config.batch.poll_timeout_secs, 0);
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let args = Args::try_parse_from(["voicebatch", "data.csv", "es-CO", "Salome"]).unwrap();
        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config, Config::default());
    }
}
