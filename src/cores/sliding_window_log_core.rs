use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ensure_positive_count, ConfigError, ConfigResult};
use crate::factory::AlgorithmKind;
use crate::rate_limit::RateLimitAlgorithm;
use crate::types::{AdmissionResult, Millis, RejectReason};

/// Core implementation of the sliding window log rate limiting algorithm.
///
/// The log keeps the timestamp of every admitted request that still falls
/// inside the trailing window `(now - window_size_ms, now]`. A request is
/// admitted while fewer than `limit` timestamps remain in the window.
///
/// This is the exact sliding window: memory grows with the number of
/// requests admitted per window, in exchange for no approximation error.
/// See [`SlidingWindowCounterCore`](super::SlidingWindowCounterCore) for the
/// constant-memory estimate.
///
/// # Algorithm Behavior
///
/// - Each call first prunes every stored timestamp `<= now - window_size_ms`
/// - Only admitted requests are logged; rejections leave no trace
/// - The log is kept in ascending order
///
/// # Example
///
/// ```rust
/// use rate_sim_core::cores::SlidingWindowLogCore;
/// use rate_sim_core::RateLimitAlgorithm;
///
/// // 5 requests per 10 second sliding window
/// let mut log = SlidingWindowLogCore::new(5, 10_000).unwrap();
///
/// for t in 0..5 {
///     assert!(log.admit(t).is_allowed());
/// }
/// assert!(!log.admit(5).is_allowed());
///
/// // Every logged request has slid out of the window
/// assert!(log.admit(10_005).is_allowed());
/// assert_eq!(log.state(10_005).timestamps, vec![10_005]);
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindowLogCore {
    /// Maximum number of requests admitted within any window
    limit: u64,
    /// Duration of the trailing window in milliseconds
    window_size_ms: Millis,
    /// Timestamps of admitted requests, ascending
    log: VecDeque<Millis>,
}

/// Snapshot of a [`SlidingWindowLogCore`] as seen at a given time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidingWindowLogState {
    /// Number of logged requests inside the window.
    pub count: u64,
    pub limit: u64,
    /// Exclusive lower edge of the window, clamped at 0.
    pub window_start: Millis,
    /// Inclusive upper edge of the window (the queried time).
    pub window_end: Millis,
    /// Logged requests inside the window, ascending.
    pub timestamps: Vec<Millis>,
}

impl SlidingWindowLogCore {
    /// Creates a new sliding window log.
    ///
    /// # Parameters
    ///
    /// * `limit` - Maximum number of requests admitted within any window
    /// * `window_size_ms` - Duration of the trailing window in milliseconds
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if either parameter is zero.
    pub fn new(limit: u64, window_size_ms: Millis) -> ConfigResult<Self> {
        Ok(SlidingWindowLogCore {
            limit: ensure_positive_count("limit", limit)?,
            window_size_ms: ensure_positive_count("window_size_ms", window_size_ms)?,
            log: VecDeque::new(),
        })
    }

    /// Returns the configuration this log was built with.
    pub fn config(&self) -> SlidingWindowLogCoreConfig {
        SlidingWindowLogCoreConfig::new(self.limit, self.window_size_ms)
    }

    /// Whether `timestamp` is still inside the window ending at `now`.
    ///
    /// Before the first full window has elapsed nothing can have expired.
    #[inline]
    fn in_window(&self, timestamp: Millis, now: Millis) -> bool {
        match now.checked_sub(self.window_size_ms) {
            Some(cutoff) => timestamp > cutoff,
            None => true,
        }
    }

    fn prune(&mut self, now: Millis) {
        while let Some(&oldest) = self.log.front() {
            if self.in_window(oldest, now) {
                break;
            }
            self.log.pop_front();
        }
    }
}

impl RateLimitAlgorithm for SlidingWindowLogCore {
    type State = SlidingWindowLogState;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::SlidingLog
    }

    fn admit(&mut self, now: Millis) -> AdmissionResult {
        self.prune(now);

        if (self.log.len() as u64) < self.limit {
            // Insert in order so the front is always the oldest entry
            let at = self.log.partition_point(|&t| t <= now);
            self.log.insert(at, now);
            trace!(now, logged = self.log.len(), "sliding log admit");
            AdmissionResult::allowed()
        } else {
            debug!(now, logged = self.log.len(), "sliding log reject");
            AdmissionResult::rejected(RejectReason::WindowLimitExceeded)
        }
    }

    fn state(&self, now: Millis) -> SlidingWindowLogState {
        let timestamps: Vec<Millis> = self
            .log
            .iter()
            .copied()
            .filter(|&t| self.in_window(t, now))
            .collect();

        SlidingWindowLogState {
            count: timestamps.len() as u64,
            limit: self.limit,
            window_start: now.saturating_sub(self.window_size_ms),
            window_end: now,
            timestamps,
        }
    }
}

/// Configuration structure for creating a `SlidingWindowLogCore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidingWindowLogCoreConfig {
    /// Maximum number of requests admitted within any window.
    pub limit: u64,
    /// Duration of the trailing window in milliseconds.
    pub window_size_ms: Millis,
}

impl SlidingWindowLogCoreConfig {
    /// Creates a new configuration instance.
    pub fn new(limit: u64, window_size_ms: Millis) -> Self {
        Self { limit, window_size_ms }
    }
}

impl TryFrom<SlidingWindowLogCoreConfig> for SlidingWindowLogCore {
    type Error = ConfigError;

    fn try_from(config: SlidingWindowLogCoreConfig) -> ConfigResult<Self> {
        SlidingWindowLogCore::new(config.limit, config.window_size_ms)
    }
}
