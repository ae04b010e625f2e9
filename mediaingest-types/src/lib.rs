//! Core type definitions for media ingest manifests.
//!
//! This crate defines the plain records exchanged with the remote media
//! data service:
//! - Manifest, manifest asset, manifest file and asset identifiers (UUID v7)
//! - `IngestManifestFileData`, the record describing one local file queued
//!   for upload
//! - `IngestManifestAssetData` and `AssetData`, the parents a manifest file
//!   belongs to
//!
//! Persistence, retry and transport concerns live in `mediaingest-client`.

mod ids;
mod manifest;

pub use ids::{AssetId, ManifestAssetId, ManifestFileId, ManifestId};
pub use manifest::{
    AssetData, IngestManifestAssetData, IngestManifestFileData, IngestManifestFileState,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid identifier: {0}")]
    InvalidId(#[from] uuid::Error),
}
