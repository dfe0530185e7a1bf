pub mod batch;
pub mod config;
pub mod dataset;
pub mod status;
pub mod target;
pub mod testing;
pub mod throttle;
pub mod tts_client;

pub use batch::{
    AssetFetcher, BatchDriver, BatchReport, BatchSettings, FetchedAsset, JobPoller, JobSubmitter,
    PollSettings, RowError, RowOutcome, RowStateWriter,
};
pub use config::{
    load_config, load_config_from_str, load_default_config, resolve_credentials, validate_config,
    ApiConfig, BatchConfig, Config, ConfigError, Credentials, StorageConfig, API_KEY_ENV,
    USER_ID_ENV,
};
pub use dataset::{
    default_snapshot_path, resolve_destination, CsvDatasetStore, Dataset, DatasetError,
    DatasetStore, Destination, Row, TargetColumns,
};
pub use status::{classify, Action, RowStatus, UnsubmittedMarker};
pub use target::Target;
pub use throttle::{Throttle, ThrottleStatus};
pub use tts_client::{
    JobStatus, PlayHtClient, PlayHtConfig, SynthesisRequest, TtsClient, TtsClientError,
};
