//! The ingest manifest file collection.
//!
//! `create` turns a local file into a persisted manifest file record;
//! `IngestManifestFile::delete` removes it again. Both build a
//! [`SaveOperation`] on a fresh context and run it under a retry policy.
//!
//! Operations on the same entity are not serialized: two concurrent deletes
//! of one file reach the service in no particular order.

use crate::context::DataContextFactory;
use crate::error::{ClientError, ClientResult, SaveFailure};
use crate::retry::{Attempted, RetryExecutor, RetryPolicy};
use crate::save::{RemoteEntity, SaveOperation};
use mediaingest_types::{IngestManifestAssetData, IngestManifestFileData, ManifestFileId};
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Manifest files belonging to one manifest asset.
pub struct IngestManifestFileCollection {
    factory: Arc<dyn DataContextFactory>,
    parent: IngestManifestAssetData,
    policy: RetryPolicy,
}

impl IngestManifestFileCollection {
    /// Creates a collection using the default retry policy.
    pub fn new(factory: Arc<dyn DataContextFactory>, parent: IngestManifestAssetData) -> Self {
        Self {
            factory,
            parent,
            policy: RetryPolicy::default(),
        }
    }

    /// Replaces the policy used by `create` and by files this collection
    /// hands out.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn parent(&self) -> &IngestManifestAssetData {
        &self.parent
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Registers the local file at `path` with the remote store.
    pub async fn create(&self, path: impl AsRef<Path>) -> ClientResult<IngestManifestFile> {
        self.create_with(path, &self.policy, None).await
    }

    /// Same as [`create`](Self::create) with a per-call policy and an
    /// optional cancellation token.
    pub async fn create_with(
        &self,
        path: impl AsRef<Path>,
        policy: &RetryPolicy,
        cancel: Option<&CancellationToken>,
    ) -> ClientResult<IngestManifestFile> {
        let path = path.as_ref();
        let tentative = self.describe(path).await?;
        debug!(
            name = %tentative.name,
            size = tentative.content_file_size,
            "creating manifest file"
        );

        let operation = SaveOperation::create(self.factory.create_context(), tentative)?;
        let Attempted {
            value: data,
            attempts,
        } = run_save(policy, &operation, cancel).await?;

        info!(
            name = %data.name,
            id = ?data.id,
            attempts,
            "manifest file created"
        );
        Ok(self.attach(data))
    }

    /// Wraps an already persisted record so it can be managed.
    pub fn attach(&self, data: IngestManifestFileData) -> IngestManifestFile {
        IngestManifestFile {
            data,
            factory: Arc::clone(&self.factory),
            policy: self.policy.clone(),
        }
    }

    /// Builds the tentative record for a local file.
    async fn describe(&self, path: &Path) -> ClientResult<IngestManifestFileData> {
        if path.as_os_str().is_empty() {
            return Err(ClientError::InvalidPath("path is empty".to_string()));
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| ClientError::InvalidPath(path.display().to_string()))?;

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ClientError::FileNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(ClientError::FileNotFound(path.to_path_buf()));
        }

        Ok(IngestManifestFileData::pending(name, metadata.len()).with_parent(&self.parent))
    }
}

impl fmt::Debug for IngestManifestFileCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestManifestFileCollection")
            .field("parent", &self.parent)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// A manifest file record known to the remote store.
pub struct IngestManifestFile {
    data: IngestManifestFileData,
    factory: Arc<dyn DataContextFactory>,
    policy: RetryPolicy,
}

impl IngestManifestFile {
    pub fn id(&self) -> Option<ManifestFileId> {
        self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// The record as last confirmed by the server.
    pub fn data(&self) -> &IngestManifestFileData {
        &self.data
    }

    pub fn into_data(self) -> IngestManifestFileData {
        self.data
    }

    /// Deletes the record from the remote store.
    pub async fn delete(&self) -> ClientResult<()> {
        self.delete_with(&self.policy, None).await
    }

    /// Same as [`delete`](Self::delete) with a per-call policy and an
    /// optional cancellation token.
    pub async fn delete_with(
        &self,
        policy: &RetryPolicy,
        cancel: Option<&CancellationToken>,
    ) -> ClientResult<()> {
        let operation = SaveOperation::delete(self.factory.create_context(), self.data.clone())?;
        let attempted = run_save(policy, &operation, cancel).await?;

        info!(
            name = %self.data.name,
            id = ?self.data.id,
            attempts = attempted.attempts,
            "manifest file deleted"
        );
        Ok(())
    }
}

impl fmt::Debug for IngestManifestFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestManifestFile")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

async fn run_save<E: RemoteEntity>(
    policy: &RetryPolicy,
    operation: &SaveOperation<E>,
    cancel: Option<&CancellationToken>,
) -> Result<Attempted<E>, SaveFailure> {
    let executor = RetryExecutor::new(policy.clone());
    match cancel {
        Some(token) => executor.execute_cancellable(|| operation.invoke(), token).await,
        None => executor.execute(|| operation.invoke()).await,
    }
}
