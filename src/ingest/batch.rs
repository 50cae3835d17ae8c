//! Sequential batch upload with a fixed pause between submissions.

use crate::index::{Record, SearchIndex};
use crate::ingest::types::{BatchSettings, IngestError, UploadOutcome};

/// Number of batches needed for `total` records.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    total.div_ceil(batch_size)
}

/// Submits a record collection to the index in contiguous, bounded batches.
///
/// Batches go out strictly one after another. The first rejected batch aborts the run;
/// batches already accepted are left in place.
pub struct BatchUploader {
    settings: BatchSettings,
}

impl BatchUploader {
    /// Build an uploader, rejecting a zero batch size.
    pub fn new(settings: BatchSettings) -> Result<Self, IngestError> {
        if settings.batch_size == 0 {
            return Err(IngestError::InvalidBatchSize);
        }
        Ok(Self { settings })
    }

    /// Settings in effect.
    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Upload `records`, returning every accepted task uid in submission order.
    pub async fn upload<I>(&self, index: &I, records: &[Record]) -> Result<UploadOutcome, IngestError>
    where
        I: SearchIndex + ?Sized,
    {
        let BatchSettings {
            batch_size,
            delay,
            primary_key,
        } = &self.settings;
        let total_batches = batch_count(records.len(), *batch_size);
        tracing::info!(
            documents = records.len(),
            batches = total_batches,
            batch_size,
            "Starting upload"
        );

        let mut outcome = UploadOutcome::default();
        for (position, batch) in records.chunks(*batch_size).enumerate() {
            let number = position + 1;
            let start = position * batch_size;
            let end = start + batch.len();
            tracing::debug!(batch = number, total_batches, documents = batch.len(), "Uploading batch");

            let info = index
                .add_documents(batch, primary_key)
                .await
                .map_err(|source| {
                    tracing::error!(batch = number, start, end, error = %source, "Batch upload failed");
                    IngestError::BatchSubmission {
                        batch: number,
                        start,
                        end,
                        source,
                    }
                })?;
            outcome.task_uids.push(info.task_uid);
            outcome.documents += batch.len();
            tracing::info!(
                batch = number,
                total_batches,
                task_uid = info.task_uid,
                "Batch accepted"
            );

            if end < records.len() && !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
        }

        Ok(outcome)
    }
}
