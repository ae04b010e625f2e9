//! HTTP data context.
//!
//! Pushes staged changes to the data service as JSON over reqwest:
//! inserts are `POST {base}/{EntitySet}`, deletes are
//! `DELETE {base}/{EntitySet}('{key}')`. Every failure is reported as a
//! [`TransportFault`] with a status the retry classifier understands. A 404
//! on a DELETE counts as success only when an earlier save already sent it.

use crate::config::ClientConfig;
use crate::context::{
    ChangeKind, ChangeResponse, ChangeTracker, DataContextFactory, DataServiceContext,
    PendingChange,
};
use crate::error::{ClientError, ClientResult, FaultStatus, TransportFault, TransportResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// A context that saves changes against the data service over HTTP.
pub struct HttpDataContext {
    client: Client,
    api_base_url: String,
    max_message_bytes: u64,
    tracker: ChangeTracker,
    /// Responses of changes accepted during an attempt that later failed.
    completed: Mutex<Vec<ChangeResponse>>,
}

impl HttpDataContext {
    pub fn new(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            max_message_bytes: config.max_message_bytes,
            tracker: ChangeTracker::new(),
            completed: Mutex::new(Vec::new()),
        }
    }

    /// Changes staged but not yet accepted by the service.
    pub fn pending(&self) -> Vec<PendingChange> {
        self.tracker.pending()
    }

    async fn send(&self, change: &PendingChange) -> TransportResult<ChangeResponse> {
        match change.kind {
            ChangeKind::Added => self.send_insert(change).await,
            ChangeKind::Deleted => self.send_delete(change).await,
        }
    }

    async fn send_insert(&self, change: &PendingChange) -> TransportResult<ChangeResponse> {
        let body = serde_json::to_vec(change.payload.as_ref().unwrap_or(&Value::Null))
            .map_err(|e| TransportFault::new(FaultStatus::UnknownError, e.to_string()))?;
        if body.len() as u64 > self.max_message_bytes {
            return Err(TransportFault::new(
                FaultStatus::MessageLengthLimitExceeded,
                format!(
                    "request body of {} bytes exceeds the {} byte limit",
                    body.len(),
                    self.max_message_bytes
                ),
            ));
        }

        let url = format!("{}/{}", self.api_base_url, change.entity_set);
        debug!(%url, bytes = body.len(), "POST entity");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(fault_from_reqwest)?;
        let response = check_status(response).await?;

        let bytes = response.bytes().await.map_err(fault_from_reqwest)?;
        let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
            TransportFault::new(
                FaultStatus::ServerProtocolViolation,
                format!("invalid response body: {e}"),
            )
        })?;

        Ok(ChangeResponse {
            entity_set: change.entity_set.clone(),
            kind: ChangeKind::Added,
            payload: Some(payload),
        })
    }

    async fn send_delete(&self, change: &PendingChange) -> TransportResult<ChangeResponse> {
        let key = change.key.as_deref().ok_or_else(|| {
            TransportFault::new(FaultStatus::UnknownError, "delete staged without a key")
        })?;
        let url = format!("{}/{}('{}')", self.api_base_url, change.entity_set, key);
        debug!(%url, "DELETE entity");

        let response = self
            .client
            .delete(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(fault_from_reqwest)?;

        // A resend that finds nothing: the earlier attempt deleted it before
        // its response was lost.
        if change.sent && response.status() == StatusCode::NOT_FOUND {
            debug!(%url, "entity already gone on resend");
        } else {
            check_status(response).await?;
        }

        Ok(ChangeResponse {
            entity_set: change.entity_set.clone(),
            kind: ChangeKind::Deleted,
            payload: None,
        })
    }

    fn completed_guard(&self) -> std::sync::MutexGuard<'_, Vec<ChangeResponse>> {
        self.completed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DataServiceContext for HttpDataContext {
    fn add_object(&self, entity_set: &str, payload: Value) {
        self.tracker.add(entity_set, payload);
    }

    // Deletes are addressed by key in the URL; attaching stages nothing.
    fn attach_to(&self, _entity_set: &str, _key: &str, _payload: Value) {}

    fn delete_object(&self, entity_set: &str, key: &str) {
        self.tracker.delete(entity_set, key);
    }

    async fn save_changes(&self) -> TransportResult<Vec<ChangeResponse>> {
        while let Some(change) = self.tracker.begin_front() {
            let response = self.send(&change).await?;
            self.tracker.complete_front();
            self.completed_guard().push(response);
        }
        Ok(std::mem::take(&mut *self.completed_guard()))
    }
}

/// Hands out one [`HttpDataContext`] per operation, sharing a connection pool.
#[derive(Debug, Clone)]
pub struct HttpContextFactory {
    client: Client,
    config: ClientConfig,
}

impl HttpContextFactory {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl DataContextFactory for HttpContextFactory {
    fn create_context(&self) -> Arc<dyn DataServiceContext> {
        Arc::new(HttpDataContext::new(self.client.clone(), &self.config))
    }
}

async fn check_status(response: Response) -> TransportResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("<response body unreadable: {e}>"),
    };
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return Err(TransportFault::new(
            FaultStatus::MessageLengthLimitExceeded,
            format!("server rejected payload: {body}"),
        ));
    }
    Err(TransportFault::protocol(
        status.as_u16(),
        format!("{status}: {body}"),
    ))
}

fn fault_from_reqwest(e: reqwest::Error) -> TransportFault {
    let status = if e.is_timeout() {
        FaultStatus::Timeout
    } else if e.is_connect() {
        FaultStatus::ConnectFailure
    } else if e.is_request() {
        FaultStatus::SendFailure
    } else if e.is_body() || e.is_decode() {
        FaultStatus::ReceiveFailure
    } else {
        FaultStatus::UnknownError
    };
    TransportFault::new(status, e.to_string())
}
