//! Save operations: one create or delete submitted to the retry executor.

use crate::context::{ChangeKind, DataServiceContext};
use crate::error::{ClientError, ClientResult, FaultStatus, TransportFault, TransportResult};
use mediaingest_types::IngestManifestFileData;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// An entity type persisted in a named entity set of the remote store.
pub trait RemoteEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const ENTITY_SET: &'static str;

    /// Server key, once the store has assigned one.
    fn key(&self) -> Option<String>;
}

impl RemoteEntity for IngestManifestFileData {
    const ENTITY_SET: &'static str = "IngestManifestFiles";

    fn key(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Create,
    Delete,
}

/// A single create or delete bound to the context it was staged on.
///
/// Building the operation stages the change once; every [`invoke`] is one
/// remote attempt. The operation knows nothing about retries.
///
/// [`invoke`]: SaveOperation::invoke
pub struct SaveOperation<E: RemoteEntity> {
    context: Arc<dyn DataServiceContext>,
    entity: E,
    kind: SaveKind,
}

impl<E: RemoteEntity> SaveOperation<E> {
    /// Stages `entity` for insertion.
    pub fn create(context: Arc<dyn DataServiceContext>, entity: E) -> ClientResult<Self> {
        let payload = serde_json::to_value(&entity)?;
        context.add_object(E::ENTITY_SET, payload);
        Ok(Self {
            context,
            entity,
            kind: SaveKind::Create,
        })
    }

    /// Attaches an already persisted `entity` and stages its deletion.
    pub fn delete(context: Arc<dyn DataServiceContext>, entity: E) -> ClientResult<Self> {
        let key = entity
            .key()
            .ok_or_else(|| ClientError::NotPersisted(E::ENTITY_SET.to_string()))?;
        let payload = serde_json::to_value(&entity)?;
        context.attach_to(E::ENTITY_SET, &key, payload);
        context.delete_object(E::ENTITY_SET, &key);
        Ok(Self {
            context,
            entity,
            kind: SaveKind::Delete,
        })
    }

    pub fn kind(&self) -> SaveKind {
        self.kind
    }

    /// The entity as staged by the client.
    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// Issues one save attempt.
    ///
    /// A create yields the entity as confirmed by the server. The service
    /// answers a delete without a body, so a delete hands back the entity as
    /// staged.
    pub async fn invoke(&self) -> TransportResult<E> {
        let responses = self.context.save_changes().await?;
        match self.kind {
            SaveKind::Delete => Ok(self.entity.clone()),
            SaveKind::Create => {
                let payload = responses
                    .into_iter()
                    .find(|r| r.entity_set == E::ENTITY_SET && r.kind == ChangeKind::Added)
                    .and_then(|r| r.payload)
                    .ok_or_else(|| {
                        TransportFault::new(
                            FaultStatus::ServerProtocolViolation,
                            format!("no {} entity in save response", E::ENTITY_SET),
                        )
                    })?;
                serde_json::from_value(payload).map_err(|e| {
                    TransportFault::new(
                        FaultStatus::ServerProtocolViolation,
                        format!("invalid {} entity in save response: {e}", E::ENTITY_SET),
                    )
                })
            }
        }
    }
}
