use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ensure_positive_count, ConfigError, ConfigResult};
use crate::factory::AlgorithmKind;
use crate::rate_limit::RateLimitAlgorithm;
use crate::types::{AdmissionResult, Millis, RejectReason};

/// Core implementation of a concurrency limiter.
///
/// Unlike the other cores this one is not time based: it counts in-flight
/// requests. Each admitted request holds a slot until [`release`](Self::release)
/// is called. The timestamp passed to `admit` is accepted and ignored.
///
/// # Example
///
/// ```rust
/// use rate_sim_core::cores::ConcurrencyLimiterCore;
/// use rate_sim_core::RateLimitAlgorithm;
///
/// let mut limiter = ConcurrencyLimiterCore::new(3).unwrap();
///
/// for _ in 0..3 {
///     assert!(limiter.admit(0).is_allowed());
/// }
/// assert!(!limiter.admit(0).is_allowed());
///
/// limiter.release();
/// assert!(limiter.admit(0).is_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiterCore {
    max_concurrency: u64,
    active_count: u64,
}

/// Snapshot of a [`ConcurrencyLimiterCore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcurrencyState {
    pub active_count: u64,
    pub max_concurrency: u64,
}

impl ConcurrencyLimiterCore {
    /// Creates a limiter allowing at most `max_concurrency` requests in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if `max_concurrency` is zero.
    pub fn new(max_concurrency: u64) -> ConfigResult<Self> {
        Ok(ConcurrencyLimiterCore {
            max_concurrency: ensure_positive_count("max_concurrency", max_concurrency)?,
            active_count: 0,
        })
    }

    /// Frees one slot.
    ///
    /// Releasing with no active request is a no-op; the count never goes
    /// below zero.
    pub fn release(&mut self) {
        match self.active_count.checked_sub(1) {
            Some(active) => {
                self.active_count = active;
                trace!(active_count = active, "concurrency release");
            }
            None => debug!("concurrency release with no active request"),
        }
    }

    /// Returns the configuration this limiter was built with.
    pub fn config(&self) -> ConcurrencyLimiterCoreConfig {
        ConcurrencyLimiterCoreConfig::new(self.max_concurrency)
    }
}

impl RateLimitAlgorithm for ConcurrencyLimiterCore {
    type State = ConcurrencyState;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Concurrency
    }

    fn admit(&mut self, _now: Millis) -> AdmissionResult {
        if self.active_count < self.max_concurrency {
            self.active_count += 1;
            trace!(active_count = self.active_count, "concurrency admit");
            AdmissionResult::allowed()
        } else {
            debug!(max_concurrency = self.max_concurrency, "concurrency reject");
            AdmissionResult::rejected(RejectReason::MaxConcurrencyReached)
        }
    }

    fn state(&self, _now: Millis) -> ConcurrencyState {
        ConcurrencyState {
            active_count: self.active_count,
            max_concurrency: self.max_concurrency,
        }
    }
}

/// Configuration structure for creating a `ConcurrencyLimiterCore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcurrencyLimiterCoreConfig {
    /// Maximum number of requests in flight.
    pub max_concurrency: u64,
}

impl ConcurrencyLimiterCoreConfig {
    /// Creates a new configuration instance.
    pub fn new(max_concurrency: u64) -> Self {
        Self { max_concurrency }
    }
}

impl TryFrom<ConcurrencyLimiterCoreConfig> for ConcurrencyLimiterCore {
    type Error = ConfigError;

    fn try_from(config: ConcurrencyLimiterCoreConfig) -> ConfigResult<Self> {
        ConcurrencyLimiterCore::new(config.max_concurrency)
    }
}
