//! Bounded retry executor.
//!
//! Runs an operation until it succeeds, fails with a fault the policy's
//! classifier rejects, or uses up the attempt ceiling. Attempts are strictly
//! sequential and backoff waits are async sleeps.

use super::policy::RetryPolicy;
use crate::error::{FailureKind, FaultStatus, SaveFailure, TransportFault, TransportResult};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A successful result together with the attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

impl<T> Attempted<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Executes operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `operation` until success, a fatal fault or the attempt ceiling.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<Attempted<T>, SaveFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        self.run(operation, None).await
    }

    /// Like [`execute`](Self::execute), but stops as soon as `cancel` fires.
    ///
    /// The token is checked before every attempt and raced against every
    /// backoff wait. An attempt already in flight is allowed to finish.
    pub async fn execute_cancellable<T, F, Fut>(
        &self,
        operation: F,
        cancel: &CancellationToken,
    ) -> Result<Attempted<T>, SaveFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        self.run(operation, Some(cancel)).await
    }

    async fn run<T, F, Fut>(
        &self,
        mut operation: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<Attempted<T>, SaveFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut last_fault: Option<TransportFault> = None;
        let mut attempt: u32 = 1;

        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                let fault = last_fault.unwrap_or_else(|| {
                    TransportFault::new(FaultStatus::RequestCanceled, "operation cancelled")
                });
                return Err(SaveFailure::new(fault, attempt - 1, FailureKind::Cancelled));
            }

            debug!(attempt, max_attempts, "issuing save attempt");

            let fault = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(attempts = attempt, "save succeeded after retry");
                    }
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    });
                }
                Err(fault) => fault,
            };

            if !self.policy.is_retryable(&fault) {
                error!(
                    attempt,
                    status = %fault.status(),
                    error = %fault,
                    "save failed with non-retryable fault"
                );
                return Err(SaveFailure::new(fault, attempt, FailureKind::Fatal));
            }

            if attempt >= max_attempts {
                error!(
                    attempts = attempt,
                    status = %fault.status(),
                    error = %fault,
                    "save failed, retries exhausted"
                );
                return Err(SaveFailure::new(fault, attempt, FailureKind::Exhausted));
            }

            let delay = self.policy.backoff().delay_for(attempt);
            warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                status = %fault.status(),
                "save failed, retrying"
            );

            match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            warn!(attempt, "save cancelled during backoff");
                            return Err(SaveFailure::new(fault, attempt, FailureKind::Cancelled));
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                None if !delay.is_zero() => tokio::time::sleep(delay).await,
                None => {}
            }

            last_fault = Some(fault);
            attempt += 1;
        }
    }
}
