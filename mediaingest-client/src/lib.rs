//! Ingest manifest file collection for the media data service.
//!
//! Creates and deletes manifest file records remotely, retrying transient
//! transport failures under a bounded policy.
//!
//! # Architecture
//!
//! - **Classifier**: decides retryable vs fatal from a fault's status
//! - **Executor**: re-runs one save under a [`RetryPolicy`]
//! - **Save operation**: one create or delete staged on a context
//! - **Collection**: the user-facing `create(path)` / `delete()` API
//!
//! The remote store is reached through [`DataServiceContext`]; the
//! [`HttpDataContext`] implementation talks JSON over reqwest, and tests
//! inject their own.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mediaingest_client::{ClientConfig, HttpContextFactory, IngestManifestFileCollection};
//! use mediaingest_types::IngestManifestAssetData;
//!
//! # async fn example() -> mediaingest_client::ClientResult<()> {
//! let config = ClientConfig::load("mediaingest.json")?;
//! let policy = config.retry_policy();
//! let factory = Arc::new(HttpContextFactory::new(config)?);
//!
//! let files = IngestManifestFileCollection::new(factory, IngestManifestAssetData::default())
//!     .with_policy(policy);
//! let file = files.create("/media/intro.mp4").await?;
//! println!("registered {}", file.name());
//! file.delete().await?;
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod context;
mod error;
pub mod http;
pub mod retry;
pub mod save;

pub use collection::{IngestManifestFile, IngestManifestFileCollection};
pub use config::ClientConfig;
pub use context::{
    ChangeKind, ChangeResponse, ChangeTracker, DataContextFactory, DataServiceContext,
    PendingChange,
};
pub use error::{
    ClientError, ClientResult, FailureKind, FaultStatus, SaveFailure, TransportFault,
    TransportResult,
};
pub use http::{HttpContextFactory, HttpDataContext};
pub use retry::{
    Attempted, BackoffSchedule, RetryConfig, RetryExecutor, RetryPolicy, SaveChangesClassifier,
    TransientFaultClassifier,
};
pub use save::{RemoteEntity, SaveKind, SaveOperation};

pub use tokio_util::sync::CancellationToken;
