//! Bounded extraction worker pool
//!
//! Ingestion enqueues one [`ExtractionJob`] per upload; a fixed number of
//! workers drain the shared queue, run the conversion, and record the
//! terminal outcome through an [`OutcomeSink`]. Queue capacity and pool
//! size bound how much concurrent load the external recognition services
//! see. No retries: a failed attachment requires a fresh upload.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::Result;
use crate::modules::extraction::error::ExtractError;
use crate::modules::extraction::{MediaConverter, MediaKind};
use crate::modules::storage::MediaStore;
use crate::shared::constants::CONVERSION_ERROR_PREFIX;

/// One unit of extraction work, created at ingestion time
#[derive(Debug)]
pub struct ExtractionJob {
    pub attachment_id: Uuid,
    pub kind: MediaKind,
    pub file_path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

/// Where workers report terminal outcomes. Production is the attachment
/// service writing to the database; tests substitute a recorder.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn record_outcome(
        &self,
        attachment_id: Uuid,
        result: std::result::Result<String, ExtractError>,
    ) -> Result<()>;

    async fn record_failure(&self, attachment_id: Uuid, diagnostic: String) -> Result<()>;
}

/// Spawn `count` workers draining the shared job queue. Workers stop when
/// the sending side is dropped.
pub fn spawn_extraction_workers(
    count: usize,
    rx: mpsc::Receiver<ExtractionJob>,
    converter: Arc<MediaConverter>,
    store: Arc<MediaStore>,
    sink: Arc<dyn OutcomeSink>,
) {
    let rx = Arc::new(Mutex::new(rx));

    for worker_id in 0..count {
        let rx = Arc::clone(&rx);
        let converter = Arc::clone(&converter);
        let store = Arc::clone(&store);
        let sink = Arc::clone(&sink);

        tokio::spawn(async move {
            info!("Extraction worker {} started", worker_id);
            loop {
                let job = { rx.lock().await.recv().await };
                let Some(job) = job else {
                    break;
                };
                process_job(worker_id, job, &converter, &store, sink.as_ref()).await;
            }
            info!("Extraction worker {} stopped", worker_id);
        });
    }
}

async fn process_job(
    worker_id: usize,
    job: ExtractionJob,
    converter: &MediaConverter,
    store: &MediaStore,
    sink: &dyn OutcomeSink,
) {
    info!(
        "Worker {} extracting attachment {} (kind: {}, file: {})",
        worker_id, job.attachment_id, job.kind, job.file_name
    );

    let data = match store.read(&job.file_path).await {
        Ok(data) => data,
        Err(e) => {
            warn!(
                "Worker {} could not read blob for attachment {}: {}",
                worker_id, job.attachment_id, e
            );
            let diagnostic = format!(
                "{}Mediendatei konnte nicht gelesen werden.",
                CONVERSION_ERROR_PREFIX
            );
            if let Err(e) = sink.record_failure(job.attachment_id, diagnostic).await {
                warn!(
                    "Failed to record read failure for attachment {}: {}",
                    job.attachment_id, e
                );
            }
            return;
        }
    };

    let result = converter
        .convert(job.kind, &data, &job.file_name, &job.mime_type)
        .await;

    match &result {
        Ok(text) => info!(
            "Worker {} extracted {} chars for attachment {}",
            worker_id,
            text.len(),
            job.attachment_id
        ),
        Err(e) => warn!(
            "Worker {} extraction failed for attachment {}: {}",
            worker_id, job.attachment_id, e
        ),
    }

    if let Err(e) = sink.record_outcome(job.attachment_id, result).await {
        warn!(
            "Failed to record outcome for attachment {}: {}",
            job.attachment_id, e
        );
    }
}
