//! Shared test helpers for client tests.

#![allow(dead_code)]

use async_trait::async_trait;
use mediaingest_client::{
    ChangeKind, ChangeResponse, ChangeTracker, DataContextFactory, DataServiceContext,
    TransportFault, TransportResult,
};
use mediaingest_types::{
    AssetData, IngestManifestAssetData, IngestManifestFileData, ManifestAssetId, ManifestFileId,
    ManifestId,
};
use serde_json::Value;
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};
use tempfile::NamedTempFile;

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A context whose `save_changes` fails with `fault` until call number
/// `succeed_on`, then succeeds echoing `response` for inserted entities.
///
/// Pass a `succeed_on` above the retry ceiling for a context that never
/// succeeds within one operation.
pub struct ScriptedContext {
    tracker: ChangeTracker,
    fault: TransportFault,
    succeed_on: u32,
    response: IngestManifestFileData,
    save_calls: AtomicU32,
    calls: Mutex<Vec<String>>,
    added: Mutex<Vec<Value>>,
}

impl ScriptedContext {
    pub fn new(
        fault: TransportFault,
        succeed_on: u32,
        response: IngestManifestFileData,
    ) -> Arc<Self> {
        Arc::new(Self {
            tracker: ChangeTracker::new(),
            fault,
            succeed_on,
            response,
            save_calls: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
        })
    }

    /// Number of `save_changes` calls so far.
    pub fn save_calls(&self) -> u32 {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Staging calls, formatted as `method:EntitySet[:key]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Payloads passed to `add_object`, in call order.
    pub fn added_payloads(&self) -> Vec<Value> {
        self.added.lock().unwrap().clone()
    }

    pub fn has_pending(&self) -> bool {
        self.tracker.has_pending()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DataServiceContext for ScriptedContext {
    fn add_object(&self, entity_set: &str, payload: Value) {
        self.record(format!("add_object:{entity_set}"));
        self.added.lock().unwrap().push(payload.clone());
        self.tracker.add(entity_set, payload);
    }

    fn attach_to(&self, entity_set: &str, key: &str, _payload: Value) {
        self.record(format!("attach_to:{entity_set}:{key}"));
    }

    fn delete_object(&self, entity_set: &str, key: &str) {
        self.record(format!("delete_object:{entity_set}:{key}"));
        self.tracker.delete(entity_set, key);
    }

    async fn save_changes(&self) -> TransportResult<Vec<ChangeResponse>> {
        let call = self.save_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call < self.succeed_on {
            return Err(self.fault.clone());
        }

        let mut responses = Vec::new();
        while let Some(change) = self.tracker.complete_front() {
            let payload = match change.kind {
                ChangeKind::Added => Some(serde_json::to_value(&self.response).unwrap()),
                ChangeKind::Deleted => None,
            };
            responses.push(ChangeResponse {
                entity_set: change.entity_set,
                kind: change.kind,
                payload,
            });
        }
        Ok(responses)
    }
}

/// A factory that always hands out the same scripted context.
pub fn factory_for(context: &Arc<ScriptedContext>) -> Arc<dyn DataContextFactory> {
    let context = Arc::clone(context);
    Arc::new(move || -> Arc<dyn DataServiceContext> { context.clone() })
}

/// A manifest asset with ids, as the parent of a collection.
pub fn parent_asset() -> IngestManifestAssetData {
    IngestManifestAssetData {
        id: Some(ManifestAssetId::new()),
        parent_ingest_manifest_id: Some(ManifestId::new()),
        asset: AssetData::default(),
    }
}

/// The record the fake server hands back, named `testData`.
pub fn server_record() -> IngestManifestFileData {
    IngestManifestFileData {
        id: Some(ManifestFileId::new()),
        name: "testData".to_string(),
        ..Default::default()
    }
}

/// A temp file with a few bytes of content.
pub fn temp_source() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"ingest me").unwrap();
    file.flush().unwrap();
    file
}
