//! Wait schedule between retry attempts.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long to wait before each retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffSchedule {
    /// The same delay before every retry.
    Fixed {
        #[serde(with = "millis")]
        delay: Duration,
    },
    /// Exponential growth capped at `max`, shortened by up to `jitter` of
    /// the computed delay so concurrent clients spread out.
    Exponential {
        #[serde(with = "millis")]
        initial: Duration,
        #[serde(with = "millis")]
        max: Duration,
        multiplier: f64,
        jitter: f64,
    },
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::Exponential {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: 0.2,
        }
    }
}

impl BackoffSchedule {
    /// No wait at all. Useful for tests and for callers that pace themselves.
    pub fn none() -> Self {
        Self::Fixed {
            delay: Duration::ZERO,
        }
    }

    /// Upper bound of the delay before retry `retry` (1-based), before jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => *delay,
            Self::Exponential {
                initial,
                max,
                multiplier,
                ..
            } => {
                let exponent = retry.saturating_sub(1).min(63) as i32;
                let secs = initial.as_secs_f64() * multiplier.max(1.0).powi(exponent);
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(secs)
                }
            }
        }
    }

    /// Delay to sleep before retry `retry` (1-based), jitter applied.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        match self {
            Self::Exponential { jitter, .. } if *jitter > 0.0 && !base.is_zero() => {
                let fraction = rand::thread_rng().gen_range(0.0..=jitter.min(1.0));
                base.mul_f64(1.0 - fraction)
            }
            _ => base,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
