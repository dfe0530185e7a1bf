//! Batch driver.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dataset::{DatasetError, DatasetStore, Row};
use crate::status::{Action, RowStatus};
use crate::target::Target;
use crate::throttle::Throttle;
use crate::tts_client::TtsClient;

use super::types::{BatchReport, BatchSettings, RowOutcome};
use super::{AssetFetcher, JobPoller, JobSubmitter, RowError, RowStateWriter};

/// Walks a dataset row by row and advances each row for one target.
///
/// Rows are processed strictly in order and every outbound call is awaited
/// before the next one starts. All calls share one throttle.
pub struct BatchDriver {
    settings: BatchSettings,
    target: Target,
    client: Arc<dyn TtsClient>,
    store: Arc<dyn DatasetStore>,
    throttle: Arc<Throttle>,
    submitter: JobSubmitter,
    poller: JobPoller,
    fetcher: AssetFetcher,
}

impl BatchDriver {
    pub fn new(
        settings: BatchSettings,
        target: Target,
        client: Arc<dyn TtsClient>,
        store: Arc<dyn DatasetStore>,
    ) -> Self {
        let throttle = Arc::new(Throttle::new(settings.min_call_interval));
        Self::assemble(settings, target, client, store, throttle)
    }

    /// Use `throttle` instead of the one built from the settings.
    ///
    /// Lets several drivers (or a caller doing its own requests) share one
    /// call budget.
    pub fn with_throttle(self, throttle: Arc<Throttle>) -> Self {
        Self::assemble(self.settings, self.target, self.client, self.store, throttle)
    }

    fn assemble(
        settings: BatchSettings,
        target: Target,
        client: Arc<dyn TtsClient>,
        store: Arc<dyn DatasetStore>,
        throttle: Arc<Throttle>,
    ) -> Self {
        let submitter = JobSubmitter::new(Arc::clone(&client), Arc::clone(&throttle));
        let poller = JobPoller::new(
            Arc::clone(&client),
            Arc::clone(&throttle),
            settings.poll.clone(),
        );
        let fetcher = AssetFetcher::new(
            Arc::clone(&client),
            Arc::clone(&throttle),
            settings.audio_dir.clone(),
            settings.audio_extension.clone(),
        );

        Self {
            settings,
            target,
            client,
            store,
            throttle,
            submitter,
            poller,
            fetcher,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn throttle(&self) -> &Arc<Throttle> {
        &self.throttle
    }

    /// Run the batch once over the whole dataset.
    ///
    /// Row failures are recorded in the dataset and counted in the report.
    /// Only load and save failures abort the run.
    pub async fn run(&self) -> Result<BatchReport, DatasetError> {
        let mut dataset = self.store.load()?;
        let columns = dataset.bind(&self.target, &self.settings.item_id_column)?;
        let mut report = BatchReport::new(dataset.len(), self.store.describe());

        info!(
            "Starting batch for {} via {}: {} rows, saving to {}",
            self.target,
            self.client.name(),
            dataset.len(),
            report.destination
        );

        let mut writer = RowStateWriter::new(&mut dataset, columns);
        for index in 0..writer.len() {
            let Some(row) = writer.row(index) else {
                continue;
            };

            let outcome = self.process_row(&mut writer, row, &mut report).await?;
            report.record(&outcome);

            if self.settings.checkpoint_each_row && writer.take_dirty() {
                self.store.save(writer.dataset())?;
            }
        }

        self.store.save(writer.dataset())?;

        info!("Batch for {} finished: {}", self.target, report);
        Ok(report)
    }

    async fn process_row(
        &self,
        writer: &mut RowStateWriter<'_>,
        row: Row,
        report: &mut BatchReport,
    ) -> Result<RowOutcome, DatasetError> {
        let action = row.status.action();
        debug!("Item {} ({}): {:?}", row.item_id, row.status, action);

        let url = match action {
            Action::Skip => return Ok(RowOutcome::Skipped),
            Action::DownloadOnly => match &row.status {
                RowStatus::Ready { url } => url.clone(),
                _ => return Ok(RowOutcome::Skipped),
            },
            Action::AwaitAndDownload => {
                let Some(job_id) = row.status.job_id().map(str::to_string) else {
                    let err = RowError::MissingJobId {
                        item_id: row.item_id.clone(),
                    };
                    return Ok(self.fail_row(writer, &row, err));
                };
                match self.poller.await_ready(&job_id).await {
                    Ok(url) => url,
                    Err(err) => return Ok(self.fail_row(writer, &row, err)),
                }
            }
            Action::Submit => {
                let job_id = match self.submitter.submit(&row, &self.target).await {
                    Ok(job_id) => job_id,
                    Err(err) => return Ok(self.fail_row(writer, &row, err)),
                };
                report.submitted += 1;
                self.transition(
                    writer,
                    &row,
                    RowStatus::InProgress {
                        job_id: job_id.clone(),
                    },
                );
                // The job id must survive a crash while we wait on the job.
                if self.settings.checkpoint_each_row && writer.take_dirty() {
                    self.store.save(writer.dataset())?;
                }

                match self.poller.await_ready(&job_id).await {
                    Ok(url) => url,
                    Err(err) => return Ok(self.fail_row(writer, &row, err)),
                }
            }
        };

        if action != Action::DownloadOnly {
            self.transition(writer, &row, RowStatus::Ready { url: url.clone() });
        }

        match self
            .fetcher
            .fetch(&url, &self.target.lang_code, &row.item_id)
            .await
        {
            Ok(asset) => {
                self.transition(
                    writer,
                    &row,
                    RowStatus::Terminal {
                        value: asset.path.to_string_lossy().into_owned(),
                    },
                );
                Ok(RowOutcome::Completed {
                    path: asset.path,
                    downloaded: asset.downloaded,
                })
            }
            Err(err) => Ok(self.fail_row(writer, &row, err)),
        }
    }

    fn transition(&self, writer: &mut RowStateWriter<'_>, row: &Row, status: RowStatus) {
        if writer.apply(row.index, &status) {
            info!("Item {} -> {}", row.item_id, status);
        }
    }

    /// Record a row-scoped error. Errors that fail the row set it to `error`;
    /// the rest leave whatever status the row has reached.
    fn fail_row(&self, writer: &mut RowStateWriter<'_>, row: &Row, err: RowError) -> RowOutcome {
        if err.marks_row_failed() {
            warn!("Item {} failed: {}", row.item_id, err);
            self.transition(writer, row, RowStatus::failed());
            RowOutcome::Failed(err)
        } else {
            warn!("Item {} left for a later run: {}", row.item_id, err);
            RowOutcome::Deferred(err)
        }
    }
}
