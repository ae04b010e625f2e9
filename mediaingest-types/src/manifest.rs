//! Manifest records as stored by the remote media data service.
//!
//! Field names serialize in camelCase to match the service's JSON entities.

use crate::{AssetId, ManifestAssetId, ManifestFileId, ManifestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upload state of a manifest file as tracked by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngestManifestFileState {
    /// Registered but not yet uploaded.
    #[default]
    Pending,
    /// Uploaded and picked up by the ingest pipeline.
    Finished,
    /// The ingest pipeline rejected the file.
    Error,
}

/// A local file queued for upload, persisted as a record in the remote store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestManifestFileData {
    /// Server-assigned id. `None` until the first successful save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ManifestFileId>,
    /// File name (no directory component).
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_ingest_manifest_id: Option<ManifestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_ingest_manifest_asset_id: Option<ManifestAssetId>,
    /// Size of the local content in bytes.
    #[serde(default)]
    pub content_file_size: u64,
    #[serde(default)]
    pub state: IngestManifestFileState,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl IngestManifestFileData {
    /// Creates a tentative record for a local file that has not been saved.
    #[must_use]
    pub fn pending(name: impl Into<String>, content_file_size: u64) -> Self {
        Self {
            name: name.into(),
            content_file_size,
            ..Default::default()
        }
    }

    /// Links the record to a manifest asset and its manifest.
    #[must_use]
    pub fn with_parent(mut self, parent: &IngestManifestAssetData) -> Self {
        self.parent_ingest_manifest_asset_id = parent.id;
        self.parent_ingest_manifest_id = parent.parent_ingest_manifest_id;
        self
    }

    /// Returns true once the remote store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Parses a record from a service JSON body.
    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// An asset entry inside an ingest manifest; the parent of manifest files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestManifestAssetData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ManifestAssetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_ingest_manifest_id: Option<ManifestId>,
    #[serde(default)]
    pub asset: AssetData,
}

/// The media asset that uploaded files are ingested into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AssetId>,
    #[serde(default)]
    pub name: String,
}
