//! Error types for the ingest client.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for a single remote call.
pub type TransportResult<T> = Result<T, TransportFault>;

/// Machine-readable reason attached to every transport fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FaultStatus {
    ConnectionClosed,
    ConnectFailure,
    ReceiveFailure,
    SendFailure,
    KeepAliveFailure,
    PipelineFailure,
    Timeout,
    RequestCanceled,
    NameResolutionFailure,
    /// The request exceeded the transport's message size limit.
    MessageLengthLimitExceeded,
    /// The server answered with a non-success HTTP status.
    ProtocolError,
    /// The server answered successfully but the body was not understood.
    ServerProtocolViolation,
    TrustFailure,
    UnknownError,
}

impl FaultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultStatus::ConnectionClosed => "ConnectionClosed",
            FaultStatus::ConnectFailure => "ConnectFailure",
            FaultStatus::ReceiveFailure => "ReceiveFailure",
            FaultStatus::SendFailure => "SendFailure",
            FaultStatus::KeepAliveFailure => "KeepAliveFailure",
            FaultStatus::PipelineFailure => "PipelineFailure",
            FaultStatus::Timeout => "Timeout",
            FaultStatus::RequestCanceled => "RequestCanceled",
            FaultStatus::NameResolutionFailure => "NameResolutionFailure",
            FaultStatus::MessageLengthLimitExceeded => "MessageLengthLimitExceeded",
            FaultStatus::ProtocolError => "ProtocolError",
            FaultStatus::ServerProtocolViolation => "ServerProtocolViolation",
            FaultStatus::TrustFailure => "TrustFailure",
            FaultStatus::UnknownError => "UnknownError",
        }
    }
}

impl fmt::Display for FaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure raised by one remote save attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct TransportFault {
    status: FaultStatus,
    http_status: Option<u16>,
    message: String,
}

impl TransportFault {
    pub fn new(status: FaultStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            http_status: None,
            message: message.into(),
        }
    }

    /// A `ProtocolError` carrying the HTTP status the server answered with.
    pub fn protocol(http_status: u16, message: impl Into<String>) -> Self {
        Self {
            status: FaultStatus::ProtocolError,
            http_status: Some(http_status),
            message: message.into(),
        }
    }

    pub fn status(&self) -> FaultStatus {
        self.status
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why the retry executor gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The classifier rejected the fault; no retry was attempted.
    Fatal,
    /// Every allowed attempt failed with a retryable fault.
    Exhausted,
    /// The caller cancelled before the operation could complete.
    Cancelled,
}

/// The terminal failure of a retried operation.
///
/// Wraps the fault of the last attempt together with the number of attempts
/// issued. `root_cause` returns the original fault untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("save failed after {attempts} attempt(s) ({kind:?}): {fault}")]
pub struct SaveFailure {
    #[source]
    fault: TransportFault,
    attempts: u32,
    kind: FailureKind,
}

impl SaveFailure {
    pub(crate) fn new(fault: TransportFault, attempts: u32, kind: FailureKind) -> Self {
        Self {
            fault,
            attempts,
            kind,
        }
    }

    /// The fault raised by the last attempt.
    pub fn root_cause(&self) -> &TransportFault {
        &self.fault
    }

    /// Consumes the failure, returning the fault raised by the last attempt.
    pub fn into_root_cause(self) -> TransportFault {
        self.fault
    }

    /// Number of attempts issued before giving up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn is_exhausted(&self) -> bool {
        self.kind == FailureKind::Exhausted
    }
}

/// Errors that can occur in collection operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The source path was empty or had no file name.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The source file does not exist or is not a regular file.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The entity has no server id, so there is nothing remote to act on.
    #[error("entity has not been persisted: {0}")]
    NotPersisted(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The remote save failed; see [`SaveFailure::root_cause`].
    #[error(transparent)]
    Save(#[from] SaveFailure),
}

impl ClientError {
    /// Returns the transport fault behind this error, if it came from a save.
    pub fn root_cause(&self) -> Option<&TransportFault> {
        match self {
            ClientError::Save(failure) => Some(failure.root_cause()),
            _ => None,
        }
    }

    /// Returns the save failure, if this error came from a save.
    pub fn as_save_failure(&self) -> Option<&SaveFailure> {
        match self {
            ClientError::Save(failure) => Some(failure),
            _ => None,
        }
    }
}
