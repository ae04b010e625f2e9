//! Retry machinery for remote saves.
//!
//! - [`classifier`]: decides which transport faults are worth retrying
//! - [`backoff`]: how long to wait between attempts
//! - [`policy`]: attempt ceiling + backoff + classifier
//! - [`executor`]: runs an operation under a policy

pub mod backoff;
pub mod classifier;
pub mod executor;
pub mod policy;

pub use backoff::BackoffSchedule;
pub use classifier::{SaveChangesClassifier, TransientFaultClassifier};
pub use executor::{Attempted, RetryExecutor};
pub use policy::{RetryConfig, RetryPolicy, DEFAULT_MAX_ATTEMPTS};
