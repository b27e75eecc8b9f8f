use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ensure_positive_real, ConfigError, ConfigResult};
use crate::factory::AlgorithmKind;
use crate::rate_limit::RateLimitAlgorithm;
use crate::types::{AdmissionResult, Millis, RejectReason};

/// Core implementation of the token bucket rate limiting algorithm.
///
/// The token bucket is refilled continuously at `rate_per_second` tokens per
/// second, up to `capacity`. Each admitted request consumes one token. This
/// allows bursts up to the bucket capacity while holding the long-run average
/// to the refill rate.
///
/// # Algorithm Behavior
///
/// - The bucket starts full with `capacity` tokens
/// - On every call, `elapsed_ms / 1000 * rate_per_second` tokens are added, capped at `capacity`
/// - A timestamp earlier than the last refill counts as zero elapsed time
/// - A request is admitted when at least one whole token is available
///
/// Tokens are kept as `f64`. Fractional tokens carry over between calls,
/// which keeps slow refill rates exact over time.
///
/// # Example
///
/// ```rust
/// use rate_sim_core::cores::TokenBucketCore;
/// use rate_sim_core::RateLimitAlgorithm;
///
/// // Capacity 10, refilling 2 tokens per second
/// let mut bucket = TokenBucketCore::new(10.0, 2.0).unwrap();
///
/// for _ in 0..10 {
///     assert!(bucket.admit(0).is_allowed());
/// }
/// assert!(!bucket.admit(0).is_allowed());
///
/// // 500ms later one token has accrued
/// assert!(bucket.admit(500).is_allowed());
/// assert!(!bucket.admit(500).is_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct TokenBucketCore {
    /// Maximum number of tokens the bucket can hold
    capacity: f64,
    /// Tokens added per second
    rate_per_second: f64,
    /// Current number of tokens available in the bucket
    tokens: f64,
    /// Timestamp of the last refill
    last_refill_ms: Millis,
}

/// Snapshot of a [`TokenBucketCore`] as of its last admission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBucketState {
    pub tokens: f64,
    pub capacity: f64,
    pub rate_per_second: f64,
    pub last_refill_ms: Millis,
    pub fill_percentage: f64,
}

impl TokenBucketState {
    /// Tokens rounded down for whole-unit display.
    pub fn whole_tokens(&self) -> u64 {
        self.tokens.floor() as u64
    }
}

impl TokenBucketCore {
    /// Creates a full token bucket whose refill clock starts at 0.
    ///
    /// # Parameters
    ///
    /// * `capacity` - Maximum number of tokens the bucket can hold
    /// * `rate_per_second` - Tokens added per second
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if either parameter is not
    /// a positive finite number.
    pub fn new(capacity: f64, rate_per_second: f64) -> ConfigResult<Self> {
        Self::with_start(capacity, rate_per_second, 0)
    }

    /// Creates a full token bucket whose refill clock starts at `start_ms`.
    pub fn with_start(capacity: f64, rate_per_second: f64, start_ms: Millis) -> ConfigResult<Self> {
        let capacity = ensure_positive_real("capacity", capacity)?;
        let rate_per_second = ensure_positive_real("rate_per_second", rate_per_second)?;

        Ok(TokenBucketCore {
            capacity,
            rate_per_second,
            tokens: capacity, // Bucket starts full
            last_refill_ms: start_ms,
        })
    }

    /// Returns the configuration this bucket was built with.
    pub fn config(&self) -> TokenBucketCoreConfig {
        TokenBucketCoreConfig::new(self.capacity, self.rate_per_second)
    }

    /// Adds the tokens accrued since the last refill.
    fn refill(&mut self, now: Millis) {
        let elapsed_ms = now.saturating_sub(self.last_refill_ms);
        let accrued = elapsed_ms as f64 / 1000.0 * self.rate_per_second;
        self.tokens = (self.tokens + accrued).min(self.capacity);
        self.last_refill_ms = self.last_refill_ms.max(now);
    }
}

impl RateLimitAlgorithm for TokenBucketCore {
    type State = TokenBucketState;

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::TokenBucket
    }

    fn admit(&mut self, now: Millis) -> AdmissionResult {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            trace!(now, tokens = self.tokens, "token bucket admit");
            AdmissionResult::allowed()
        } else {
            debug!(now, tokens = self.tokens, "token bucket reject");
            AdmissionResult::rejected(RejectReason::NoTokensAvailable)
        }
    }

    fn state(&self, _now: Millis) -> TokenBucketState {
        TokenBucketState {
            tokens: self.tokens,
            capacity: self.capacity,
            rate_per_second: self.rate_per_second,
            last_refill_ms: self.last_refill_ms,
            fill_percentage: self.tokens / self.capacity * 100.0,
        }
    }
}

/// Configuration structure for creating a `TokenBucketCore`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBucketCoreConfig {
    /// Maximum number of tokens the bucket can hold.
    pub capacity: f64,
    /// Tokens added per second.
    pub rate_per_second: f64,
}

impl TokenBucketCoreConfig {
    /// Creates a new configuration instance.
    pub fn new(capacity: f64, rate_per_second: f64) -> Self {
        Self { capacity, rate_per_second }
    }
}

impl TryFrom<TokenBucketCoreConfig> for TokenBucketCore {
    type Error = ConfigError;

    /// Converts a `TokenBucketCoreConfig` into a `TokenBucketCore` starting at time 0.
    ///
    /// ```
    /// use rate_sim_core::cores::{TokenBucketCore, TokenBucketCoreConfig};
    ///
    /// let bucket: Result<TokenBucketCore, _> = TokenBucketCoreConfig {
    ///     capacity: 10.0,
    ///     rate_per_second: 2.0,
    /// }.try_into();
    /// assert!(bucket.is_ok());
    /// ```
    fn try_from(config: TokenBucketCoreConfig) -> ConfigResult<Self> {
        TokenBucketCore::new(config.capacity, config.rate_per_second)
    }
}
