//! Batch ingestion pipeline: cleaning, batched upload, and task polling.

pub mod batch;
pub mod cleaner;
pub mod loader;
pub mod pipeline;
pub mod poller;
pub mod types;

pub use batch::{BatchUploader, batch_count};
pub use cleaner::{clean_record, clean_records};
pub use loader::{load_records, parse_records};
pub use pipeline::{IngestPipeline, IngestPlan, IngestReport, SmokeResult, catalog_index_settings};
pub use poller::TaskPoller;
pub use types::{BatchSettings, IngestError, PollError, UploadOutcome};
