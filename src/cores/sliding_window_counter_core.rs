use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ensure_positive_count, ConfigError, ConfigResult};
use crate::factory::AlgorithmKind;
use crate::rate_limit::RateLimitAlgorithm;
use crate::types::{AdmissionResult, Millis, RejectReason};

/// Core implementation of the weighted sliding window counter.
///
/// The sliding window counter approximates a true sliding window with only
/// two counters: the count of the current fixed window and the count of the
/// window before it. The previous window contributes in proportion to how
/// much of it still overlaps the trailing window ending at `now`.
///
/// # Weighted Estimate
///
/// With `weight = (now - window_start) / window_size_ms` in `[0, 1)`:
///
/// ```text
/// estimate = current_count + previous_count * (1 - weight)
/// ```
///
/// The estimate assumes requests in the previous window were spread evenly.
/// When they were not, it can be off by a few percent against
/// [`SlidingWindowLogCore`](super::SlidingWindowLogCore), which trades that
/// error for memory proportional to traffic. Here memory is constant.
///
/// # Window Shifts
///
/// When one or more whole windows have passed, the current count becomes the
/// previous count, the current count restarts at zero and `window_start`
/// advances by the number of windows passed. `window_start` stays aligned to
/// the initial start time plus a multiple of `window_size_ms`.
///
/// # Example
///
/// ```rust
/// use rate_sim_core::cores::SlidingWindowCounterCore;
/// use rate_sim_core::RateLimitAlgorithm;
///
/// let mut counter = SlidingWindowCounterCore::new(10, 1_000).unwrap();
///
/// for _ in 0..10 {
///     assert!(counter.admit(0).is_allowed());
/// }
/// assert!(!counter.admit(999).is_allowed());
///
/// // Half way through the next window the previous 10 weigh as 5
/// for _ in 0..5 {
///     assert!(counter.admit(1_500).is_allowed());
/// }
/// assert!(!counter.admit(1_500).is_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindowCounterCore {
    /// Maximum estimated number of requests within the sliding window
    limit: u64,
    /// Duration of each fixed window in milliseconds
    window_size_ms: Millis,
    /// Requests admitted in the window before the current one
    previous_count: u64,
    /// Requests admitted in the current window
    current_count: u64,
    /// Timestamp at which the current window started
    window_start: Millis,
}

/// Snapshot of a [`SlidingWindowCounterCore`] as seen at a given time.
///
/// If whole windows have passed since the last admission, the snapshot shows
/// the counters as the next admission would see them after shifting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidingWindowCounterState {
    pub current_count: u64,
    pub previous_count: u64,
    pub limit: u64,
    /// Weighted estimate, unrounded.
    pub estimated_count: f64,
    /// Fraction of the current window elapsed, in `[0, 1)`.
    pub weight: f64,
    pub window_start: Millis,
    pub window_end: Millis,
}

impl SlidingWindowCounterState {
    /// The estimate rounded to two decimals for display.
    pub fn rounded_estimate(&self) -> f64 {
        (self.estimated_count * 100.0).round() / 100.0
    }
}

/// Counters after applying any pending window shift.
struct Projection {
    previous_count: u64,
    current_count: u64,
    window_start: Millis,
    shifted: bool,
}

impl SlidingWindowCounterCore {
    /// Creates a new sliding window counter whose first window starts at 0.
    ///
    /// # Parameters
    ///
    /// * `limit` - Maximum estimated number of requests within the sliding window
    /// * `window_size_ms` - Duration of each fixed window in milliseconds
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if either parameter is zero.
    pub fn new(limit: u64, window_size_ms: Millis) -> ConfigResult<Self> {
        Self::with_start(limit, window_size_ms, 0)
    }

    /// Creates a new sliding window counter whose first window starts at `start_ms`.
    pub fn with_start(limit: u64, window_size_ms: Millis, start_ms: Millis) -> ConfigResult<Self> {
        Ok(SlidingWindowCounterCore {
            limit: ensure_positive_count("limit", limit)?,
            window_size_ms: ensure_positive_count("window_size_ms", window_size_ms)?,
            previous_count: 0,
            current_count: 0,
            window_start: start_ms,
        })
    }

    /// Returns the configuration this counter was built with.
    pub fn config(&self) -> SlidingWindowCounterCoreConfig {
        SlidingWindowCounterCoreConfig::new(self.limit, self.window_size_ms)
    }

    /// Works out the counters the window would hold at `now`.
    ///
    /// A timestamp before `window_start` counts as zero elapsed time.
    fn project(&self, now: Millis) -> Projection {
        let windows_passed = now.saturating_sub(self.window_start) / self.window_size_ms;
        if windows_passed > 0 {
            Projection {
                previous_count: self.current_count,
                current_count: 0,
                window_start: self.window_start + windows_passed * self.window_size_ms,
                shifted: true,
            }
        } else {
            Projection {
                previous_count: self.previous_count,
                current_count: self.current_count,
                window_start: self.window_start,
                shifted: false,
            }
        }
    }

    fn weight(&self, window_start: Millis, now: Millis) -> f64 {
        now.saturating_sub(window_start) as f64 / self.window_size_ms as f64
    }
}

/// Weighted count of requests in the sliding window.
#[inline]
fn estimate(current_count: u64, previous_count: u64, weight: f64) -> f64 {
    current_count as f64 + previous_count as f64 * (1.0 - weight)
}

impl RateLimitAlgorithm for SlidingWindowCounterCore {
    type State = SlidingWindowCounterState;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::SlidingCounter
    }

    fn admit(&mut self, now: Millis) -> AdmissionResult {
        let projection = self.project(now);
        if projection.shifted {
            debug!(
                window_start = projection.window_start,
                previous_count = projection.previous_count,
                "sliding counter shift"
            );
            self.previous_count = projection.previous_count;
            self.current_count = projection.current_count;
            self.window_start = projection.window_start;
        }

        let weight = self.weight(self.window_start, now);
        let estimated = estimate(self.current_count, self.previous_count, weight);

        if estimated < self.limit as f64 {
            self.current_count += 1;
            trace!(now, estimated, current_count = self.current_count, "sliding counter admit");
            AdmissionResult::allowed()
        } else {
            debug!(now, estimated, "sliding counter reject");
            AdmissionResult::rejected(RejectReason::SlidingWindowLimitExceeded)
        }
    }

    fn state(&self, now: Millis) -> SlidingWindowCounterState {
        let projection = self.project(now);
        let weight = self.weight(projection.window_start, now);

        SlidingWindowCounterState {
            current_count: projection.current_count,
            previous_count: projection.previous_count,
            limit: self.limit,
            estimated_count: estimate(projection.current_count, projection.previous_count, weight),
            weight,
            window_start: projection.window_start,
            window_end: projection.window_start.saturating_add(self.window_size_ms),
        }
    }
}

/// Configuration structure for creating a `SlidingWindowCounterCore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidingWindowCounterCoreConfig {
    /// Maximum estimated number of requests within the sliding window.
    pub limit: u64,
    /// Duration of each fixed window in milliseconds.
    pub window_size_ms: Millis,
}

impl SlidingWindowCounterCoreConfig {
    /// Creates a new configuration instance.
    pub fn new(limit: u64, window_size_ms: Millis) -> Self {
        Self { limit, window_size_ms }
    }
}

impl TryFrom<SlidingWindowCounterCoreConfig> for SlidingWindowCounterCore {
    type Error = ConfigError;

    fn try_from(config: SlidingWindowCounterCoreConfig) -> ConfigResult<Self> {
        SlidingWindowCounterCore::new(config.limit, config.window_size_ms)
    }
}
