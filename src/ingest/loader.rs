//! Reading product records from a JSON file.

use crate::index::Record;
use crate::ingest::types::IngestError;
use serde_json::Value;
use std::path::Path;

/// Read a JSON array of objects from `path`.
pub async fn load_records(path: &Path) -> Result<Vec<Record>, IngestError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let records = parse_records(&bytes)?;
    tracing::info!(path = %path.display(), records = records.len(), "Loaded records");
    Ok(records)
}

/// Parse a JSON array of objects.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>, IngestError> {
    let Value::Array(items) = serde_json::from_slice::<Value>(bytes)? else {
        return Err(IngestError::NotAnArray);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(IngestError::NotAnObject(position)),
        })
        .collect()
}
