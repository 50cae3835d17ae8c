#![deny(missing_docs)]

//! Product catalog search API and ingestion pipeline backed by Meilisearch.

/// HTTP routing, handlers, and the response envelope.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Search engine abstraction and shared domain types.
pub mod index;
/// Batch ingestion: cleaning, upload, and task polling.
pub mod ingest;
/// Structured logging and tracing setup.
pub mod logging;
/// Meilisearch REST client.
pub mod meili;

#[cfg(test)]
mod testing;
