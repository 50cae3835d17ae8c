//! Meilisearch integration.

pub mod client;
pub mod types;

pub use client::MeiliService;
pub use types::MeiliError;
