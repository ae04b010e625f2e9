//! Transient-fault classification.
//!
//! Transport faults all arrive through the same channel, so the verdict has
//! to come from the specific status. A connection that dropped is worth
//! another attempt; a payload over the transport's size limit fails the same
//! way every time.

use crate::error::{FaultStatus, TransportFault};
use std::collections::HashSet;

/// Decides whether a failed attempt should be retried.
///
/// Implementations must be pure: the same fault always gets the same verdict.
pub trait TransientFaultClassifier: Send + Sync {
    fn is_retryable(&self, fault: &TransportFault) -> bool;
}

impl<F> TransientFaultClassifier for F
where
    F: Fn(&TransportFault) -> bool + Send + Sync,
{
    fn is_retryable(&self, fault: &TransportFault) -> bool {
        self(fault)
    }
}

/// Statuses that indicate a connectivity hiccup rather than a bad request.
const TRANSIENT_STATUSES: &[FaultStatus] = &[
    FaultStatus::ConnectionClosed,
    FaultStatus::ConnectFailure,
    FaultStatus::ReceiveFailure,
    FaultStatus::SendFailure,
    FaultStatus::KeepAliveFailure,
    FaultStatus::PipelineFailure,
    FaultStatus::Timeout,
    FaultStatus::RequestCanceled,
    FaultStatus::NameResolutionFailure,
];

/// HTTP statuses that make a `ProtocolError` retryable.
const TRANSIENT_HTTP_STATUSES: &[u16] = &[408, 429, 500, 502, 503, 504];

/// Default classifier for save-changes calls.
#[derive(Debug, Clone)]
pub struct SaveChangesClassifier {
    transient: HashSet<FaultStatus>,
}

impl SaveChangesClassifier {
    pub fn new() -> Self {
        Self {
            transient: TRANSIENT_STATUSES.iter().copied().collect(),
        }
    }

    /// Whitelists an additional status as retryable.
    ///
    /// `MessageLengthLimitExceeded` cannot be whitelisted.
    #[must_use]
    pub fn with_transient(mut self, status: FaultStatus) -> Self {
        if status != FaultStatus::MessageLengthLimitExceeded {
            self.transient.insert(status);
        }
        self
    }
}

impl Default for SaveChangesClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TransientFaultClassifier for SaveChangesClassifier {
    fn is_retryable(&self, fault: &TransportFault) -> bool {
        match fault.status() {
            FaultStatus::MessageLengthLimitExceeded => false,
            FaultStatus::ProtocolError if !self.transient.contains(&FaultStatus::ProtocolError) => {
                fault
                    .http_status()
                    .is_some_and(|code| TRANSIENT_HTTP_STATUSES.contains(&code))
            }
            status => self.transient.contains(&status),
        }
    }
}
