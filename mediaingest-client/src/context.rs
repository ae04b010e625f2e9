//! Remote data-access abstraction.
//!
//! A [`DataServiceContext`] stages changes locally and pushes them to the
//! service in [`save_changes`](DataServiceContext::save_changes). A failed
//! save leaves the staged changes in place so the next attempt resends them.
//! Contexts are created per logical operation through a
//! [`DataContextFactory`] injected into the collection.

use crate::error::TransportResult;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// What a staged change does to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
}

/// A change staged on a context, waiting for the next save.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    pub entity_set: String,
    /// Server key; `None` for entities that have never been saved.
    pub key: Option<String>,
    pub kind: ChangeKind,
    pub payload: Option<Value>,
    /// Whether an earlier save already put this change on the wire.
    pub sent: bool,
}

/// The server's answer to one saved change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeResponse {
    pub entity_set: String,
    pub kind: ChangeKind,
    /// Server representation of the entity, for changes that return one.
    pub payload: Option<Value>,
}

/// Remote data-access collaborator.
#[async_trait]
pub trait DataServiceContext: Send + Sync {
    /// Stages a new entity for insertion into `entity_set`.
    fn add_object(&self, entity_set: &str, payload: Value);

    /// Starts tracking an entity that already exists remotely.
    fn attach_to(&self, entity_set: &str, key: &str, payload: Value);

    /// Stages the deletion of a tracked entity.
    fn delete_object(&self, entity_set: &str, key: &str);

    /// Pushes every staged change to the service, in staging order.
    async fn save_changes(&self) -> TransportResult<Vec<ChangeResponse>>;
}

/// Creates a fresh context for each logical operation.
pub trait DataContextFactory: Send + Sync {
    fn create_context(&self) -> Arc<dyn DataServiceContext>;
}

impl<F> DataContextFactory for F
where
    F: Fn() -> Arc<dyn DataServiceContext> + Send + Sync,
{
    fn create_context(&self) -> Arc<dyn DataServiceContext> {
        self()
    }
}

/// Staged-change bookkeeping shared by context implementations.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    pending: Mutex<VecDeque<PendingChange>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, entity_set: &str, payload: Value) {
        self.push(entity_set, None, ChangeKind::Added, Some(payload));
    }

    pub fn delete(&self, entity_set: &str, key: &str) {
        self.push(entity_set, Some(key.to_string()), ChangeKind::Deleted, None);
    }

    /// Snapshot of the staged changes, oldest first.
    pub fn pending(&self) -> Vec<PendingChange> {
        self.pending_guard().iter().cloned().collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_guard().is_empty()
    }

    /// The oldest staged change as it stood before this call, after which it
    /// is flagged as sent. Contexts call this right before transmitting it.
    pub fn begin_front(&self) -> Option<PendingChange> {
        let mut pending = self.pending_guard();
        let front = pending.front_mut()?;
        let snapshot = front.clone();
        front.sent = true;
        Some(snapshot)
    }

    /// Removes the oldest staged change once the service has accepted it.
    pub fn complete_front(&self) -> Option<PendingChange> {
        self.pending_guard().pop_front()
    }

    fn push(
        &self,
        entity_set: &str,
        key: Option<String>,
        kind: ChangeKind,
        payload: Option<Value>,
    ) {
        self.pending_guard().push_back(PendingChange {
            entity_set: entity_set.to_string(),
            key,
            kind,
            payload,
            sent: false,
        });
    }

    fn pending_guard(&self) -> std::sync::MutexGuard<'_, VecDeque<PendingChange>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
