//! Retry policy: attempt ceiling, backoff schedule and fault classifier.

use super::backoff::BackoffSchedule;
use super::classifier::{SaveChangesClassifier, TransientFaultClassifier};
use crate::error::TransportFault;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Attempt ceiling used when nothing else is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Serializable part of a retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts allowed for one logical operation, first try included.
    pub max_attempts: u32,
    pub backoff: BackoffSchedule,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: BackoffSchedule::default(),
        }
    }
}

/// A complete retry policy.
///
/// Cheap to clone; the classifier is shared.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffSchedule,
    classifier: Arc<dyn TransientFaultClassifier>,
}

impl RetryPolicy {
    /// Builds a policy with the default classifier. A ceiling of zero is
    /// raised to one: every operation gets at least one attempt.
    pub fn new(max_attempts: u32, backoff: BackoffSchedule) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            classifier: Arc::new(SaveChangesClassifier::default()),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff.clone())
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1, BackoffSchedule::none())
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl TransientFaultClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffSchedule) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &BackoffSchedule {
        &self.backoff
    }

    pub fn is_retryable(&self, fault: &TransportFault) -> bool {
        self.classifier.is_retryable(fault)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}
