use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ensure_positive_real, ConfigError, ConfigResult};
use crate::factory::AlgorithmKind;
use crate::rate_limit::RateLimitAlgorithm;
use crate::types::{AdmissionResult, Millis, RejectReason};

/// Core implementation of the leaky bucket rate limiting algorithm.
///
/// The leaky bucket fills by one unit per admitted request and drains
/// continuously at `rate_per_second` units per second. A request that finds
/// the bucket full is rejected. This smooths traffic to the leak rate once
/// the bucket has filled.
///
/// # Algorithm Behavior
///
/// - The bucket starts empty
/// - On every call, `elapsed_ms / 1000 * rate_per_second` units leak out, never below zero
/// - A timestamp earlier than the last leak counts as zero elapsed time
/// - A request is admitted while the water level is below `capacity`
///
/// # Example
///
/// ```rust
/// use rate_sim_core::cores::LeakyBucketCore;
/// use rate_sim_core::RateLimitAlgorithm;
///
/// // Capacity 10, leaking 2 units per second
/// let mut bucket = LeakyBucketCore::new(10.0, 2.0).unwrap();
///
/// for _ in 0..10 {
///     assert!(bucket.admit(0).is_allowed());
/// }
/// assert!(!bucket.admit(0).is_allowed());
///
/// // One second later 2 units have leaked out
/// assert!(bucket.admit(1_000).is_allowed());
/// assert!(bucket.admit(1_000).is_allowed());
/// assert!(!bucket.admit(1_000).is_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct LeakyBucketCore {
    /// Level at which the bucket overflows.
    capacity: f64,
    /// Units drained per second.
    rate_per_second: f64,
    /// Current fill level.
    water_level: f64,
    /// Timestamp of the last leak.
    last_leak_ms: Millis,
}

/// Snapshot of a [`LeakyBucketCore`] as of its last admission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakyBucketState {
    pub water_level: f64,
    pub capacity: f64,
    pub leak_rate: f64,
    pub last_leak_ms: Millis,
    /// The bucket is full and the next request at the same time overflows.
    pub overflow: bool,
}

impl LeakyBucketState {
    /// Water level rounded down for whole-unit display.
    pub fn whole_water_level(&self) -> u64 {
        self.water_level.floor() as u64
    }
}

impl LeakyBucketCore {
    /// Creates an empty leaky bucket whose leak clock starts at 0.
    ///
    /// # Parameters
    ///
    /// * `capacity` - Level at which the bucket overflows
    /// * `rate_per_second` - Units drained per second
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if either parameter is not
    /// a positive finite number.
    pub fn new(capacity: f64, rate_per_second: f64) -> ConfigResult<Self> {
        Self::with_start(capacity, rate_per_second, 0)
    }

    /// Creates an empty leaky bucket whose leak clock starts at `start_ms`.
    pub fn with_start(capacity: f64, rate_per_second: f64, start_ms: Millis) -> ConfigResult<Self> {
        Ok(LeakyBucketCore {
            capacity: ensure_positive_real("capacity", capacity)?,
            rate_per_second: ensure_positive_real("rate_per_second", rate_per_second)?,
            water_level: 0.0,
            last_leak_ms: start_ms,
        })
    }

    /// Returns the configuration this bucket was built with.
    pub fn config(&self) -> LeakyBucketCoreConfig {
        LeakyBucketCoreConfig::new(self.capacity, self.rate_per_second)
    }

    /// Drains whatever leaked out since the last call.
    fn leak(&mut self, now: Millis) {
        let elapsed_ms = now.saturating_sub(self.last_leak_ms);
        let drained = elapsed_ms as f64 / 1000.0 * self.rate_per_second;
        self.water_level = (self.water_level - drained).max(0.0);
        self.last_leak_ms = self.last_leak_ms.max(now);
    }
}

impl RateLimitAlgorithm for LeakyBucketCore {
    type State = LeakyBucketState;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::LeakyBucket
    }

    fn admit(&mut self, now: Millis) -> AdmissionResult {
        self.leak(now);

        if self.water_level < self.capacity {
            self.water_level += 1.0;
            trace!(now, water_level = self.water_level, "leaky bucket admit");
            AdmissionResult::allowed()
        } else {
            debug!(now, water_level = self.water_level, "leaky bucket overflow");
            AdmissionResult::rejected(RejectReason::BucketOverflow)
        }
    }

    fn state(&self, _now: Millis) -> LeakyBucketState {
        LeakyBucketState {
            water_level: self.water_level,
            capacity: self.capacity,
            leak_rate: self.rate_per_second,
            last_leak_ms: self.last_leak_ms,
            overflow: self.water_level >= self.capacity,
        }
    }
}

/// Configuration structure for creating a `LeakyBucketCore`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakyBucketCoreConfig {
    /// Level at which the bucket overflows.
    pub capacity: f64,
    /// Units drained per second.
    pub rate_per_second: f64,
}

impl LeakyBucketCoreConfig {
    /// Creates a new configuration instance.
    pub fn new(capacity: f64, rate_per_second: f64) -> Self {
        Self { capacity, rate_per_second }
    }
}

impl TryFrom<LeakyBucketCoreConfig> for LeakyBucketCore {
    type Error = ConfigError;

    fn try_from(config: LeakyBucketCoreConfig) -> ConfigResult<Self> {
        LeakyBucketCore::new(config.capacity, config.rate_per_second)
    }
}
