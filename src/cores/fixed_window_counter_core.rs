use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ensure_positive_count, ConfigError, ConfigResult};
use crate::factory::AlgorithmKind;
use crate::rate_limit::RateLimitAlgorithm;
use crate::types::{AdmissionResult, Millis, RejectReason};

/// Core implementation of the fixed window counter rate limiting algorithm.
///
/// The fixed window counter counts requests inside a window of
/// `window_size_ms` milliseconds. Once a request arrives at or after the end
/// of the current window, the counter resets and the window restarts at that
/// request's timestamp.
///
/// # Algorithm Behavior
///
/// - The first window starts at time 0, not at the first request
/// - A request at `t >= window_start + window_size_ms` resets the window to start at `t`
/// - Requests are admitted while `count < limit`
/// - `count` never exceeds `limit`
///
/// # Boundary Bursts
///
/// Two back-to-back windows can together admit up to `2 * limit` requests
/// when traffic clusters around the boundary. This is a property of the
/// algorithm and is kept as-is.
///
/// # Example
///
/// ```rust
/// use rate_sim_core::cores::FixedWindowCounterCore;
/// use rate_sim_core::RateLimitAlgorithm;
///
/// // 10 requests per 5 second window
/// let mut counter = FixedWindowCounterCore::new(10, 5_000).unwrap();
///
/// for _ in 0..10 {
///     assert!(counter.admit(0).is_allowed());
/// }
/// assert!(!counter.admit(0).is_allowed());
///
/// // New window: counter resets
/// assert!(counter.admit(5_000).is_allowed());
/// assert_eq!(counter.state(5_000).count, 1);
/// ```
#[derive(Debug, Clone)]
pub struct FixedWindowCounterCore {
    /// Maximum number of requests admitted per window
    limit: u64,
    /// Duration of each window in milliseconds
    window_size_ms: Millis,
    /// Requests admitted in the current window
    count: u64,
    /// Timestamp at which the current window started
    window_start: Millis,
}

/// Snapshot of a [`FixedWindowCounterCore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedWindowState {
    pub count: u64,
    pub limit: u64,
    pub window_start: Millis,
    pub window_end: Millis,
    /// Whether the queried timestamp is past the end of the stored window.
    pub is_window_expired: bool,
}

impl FixedWindowCounterCore {
    /// Creates a new fixed window counter.
    ///
    /// # Parameters
    ///
    /// * `limit` - Maximum number of requests admitted per window
    /// * `window_size_ms` - Duration of each window in milliseconds
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if either parameter is zero.
    pub fn new(limit: u64, window_size_ms: Millis) -> ConfigResult<Self> {
        Ok(FixedWindowCounterCore {
            limit: ensure_positive_count("limit", limit)?,
            window_size_ms: ensure_positive_count("window_size_ms", window_size_ms)?,
            count: 0,
            window_start: 0,
        })
    }

    /// Returns the configuration this counter was built with.
    pub fn config(&self) -> FixedWindowCounterCoreConfig {
        FixedWindowCounterCoreConfig::new(self.limit, self.window_size_ms)
    }

    #[inline]
    fn window_end(&self) -> Millis {
        self.window_start.saturating_add(self.window_size_ms)
    }
}

impl RateLimitAlgorithm for FixedWindowCounterCore {
    type State = FixedWindowState;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::FixedWindow
    }

    fn admit(&mut self, now: Millis) -> AdmissionResult {
        // Window expired: restart it at the current request
        if now >= self.window_end() {
            debug!(window_start = now, previous_count = self.count, "fixed window reset");
            self.window_start = now;
            self.count = 0;
        }

        if self.count < self.limit {
            self.count += 1;
            trace!(now, count = self.count, "fixed window admit");
            AdmissionResult::allowed()
        } else {
            debug!(now, limit = self.limit, "fixed window reject");
            AdmissionResult::rejected(RejectReason::WindowLimitExceeded)
        }
    }

    fn state(&self, now: Millis) -> FixedWindowState {
        let window_end = self.window_end();
        FixedWindowState {
            count: self.count,
            limit: self.limit,
            window_start: self.window_start,
            window_end,
            is_window_expired: now >= window_end,
        }
    }
}

/// Configuration structure for creating a `FixedWindowCounterCore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedWindowCounterCoreConfig {
    /// Maximum number of requests admitted per window.
    pub limit: u64,
    /// Duration of each window in milliseconds.
    pub window_size_ms: Millis,
}

impl FixedWindowCounterCoreConfig {
    /// Creates a new configuration instance.
    pub fn new(limit: u64, window_size_ms: Millis) -> Self {
        Self { limit, window_size_ms }
    }
}

impl TryFrom<FixedWindowCounterCoreConfig> for FixedWindowCounterCore {
    type Error = ConfigError;

    /// Converts a `FixedWindowCounterCoreConfig` into a `FixedWindowCounterCore`.
    ///
    /// ```
    /// use rate_sim_core::cores::{FixedWindowCounterCore, FixedWindowCounterCoreConfig};
    ///
    /// let counter = FixedWindowCounterCore::try_from(FixedWindowCounterCoreConfig::new(5, 1_000));
    /// assert!(counter.is_ok());
    /// ```
    fn try_from(config: FixedWindowCounterCoreConfig) -> ConfigResult<Self> {
        FixedWindowCounterCore::new(config.limit, config.window_size_ms)
    }
}
