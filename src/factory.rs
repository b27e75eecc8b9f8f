//! Construction of algorithm cores by name.
//!
//! [`create_algorithm`] is the one place the rest of an application needs to
//! know about: it maps a string discriminator and a loosely-typed
//! [`AlgorithmConfig`] onto one of the six cores, wrapped in [`Algorithm`].

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cores::{
    ConcurrencyLimiterCore, ConcurrencyState, FixedWindowCounterCore, FixedWindowState,
    LeakyBucketCore, LeakyBucketState, SlidingWindowCounterCore, SlidingWindowCounterState,
    SlidingWindowLogCore, SlidingWindowLogState, TokenBucketCore, TokenBucketState,
};
use crate::error::{ConfigError, ConfigResult};
use crate::rate_limit::RateLimitAlgorithm;
use crate::types::{AdmissionResult, Millis};

/// Window size used when a windowed algorithm is configured without one.
pub const DEFAULT_WINDOW_MS: Millis = 1_000;

/// Discriminator for the six algorithm cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    FixedWindow,
    SlidingLog,
    SlidingCounter,
    TokenBucket,
    LeakyBucket,
    Concurrency,
}

impl AlgorithmKind {
    /// Every kind, in display order.
    pub const ALL: [AlgorithmKind; 6] = [
        AlgorithmKind::FixedWindow,
        AlgorithmKind::SlidingLog,
        AlgorithmKind::SlidingCounter,
        AlgorithmKind::TokenBucket,
        AlgorithmKind::LeakyBucket,
        AlgorithmKind::Concurrency,
    ];

    /// The discriminator string accepted by [`create_algorithm`].
    pub fn as_str(&self) -> &'static str {
        use AlgorithmKind::*;
        match self {
            FixedWindow => "fixed-window",
            SlidingLog => "sliding-log",
            SlidingCounter => "sliding-counter",
            TokenBucket => "token-bucket",
            LeakyBucket => "leaky-bucket",
            Concurrency => "concurrency",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        AlgorithmKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownAlgorithm(s.to_owned()))
    }
}

/// Loosely-typed configuration accepted by the factory.
///
/// Only `limit` is required. Missing fields fall back as follows:
///
/// - `window_size_ms` defaults to [`DEFAULT_WINDOW_MS`]
/// - bucket `capacity` and `rate_per_second` fall back to `limit`
/// - `max_concurrency` falls back to `limit`
/// - `start_ms` defaults to 0
///
/// Serialized field names are camelCase (`windowSizeMs`, `ratePerSecond`).
/// Deserialization also accepts the snake_case and short forms (`window`,
/// `window_size_ms`, `rate`, ...).
///
/// # Example
///
/// ```rust
/// use rate_sim_core::AlgorithmConfig;
///
/// let config = AlgorithmConfig::new(10).window(5_000);
/// assert_eq!(config.window_size_ms, Some(5_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmConfig {
    pub limit: u64,
    #[serde(alias = "window", alias = "window_size_ms")]
    pub window_size_ms: Option<Millis>,
    pub capacity: Option<f64>,
    #[serde(alias = "rate", alias = "rate_per_second")]
    pub rate_per_second: Option<f64>,
    #[serde(alias = "max_concurrency")]
    pub max_concurrency: Option<u64>,
    #[serde(alias = "start_ms")]
    pub start_ms: Option<Millis>,
}

impl AlgorithmConfig {
    /// A configuration with only `limit` set.
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            window_size_ms: None,
            capacity: None,
            rate_per_second: None,
            max_concurrency: None,
            start_ms: None,
        }
    }

    /// Builder-style: set the window size
    pub fn window(mut self, window_size_ms: Millis) -> Self {
        self.window_size_ms = Some(window_size_ms);
        self
    }

    /// Builder-style: set the bucket capacity
    pub fn capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Builder-style: set the refill/leak rate
    pub fn rate(mut self, rate_per_second: f64) -> Self {
        self.rate_per_second = Some(rate_per_second);
        self
    }

    /// Builder-style: set the concurrency ceiling
    pub fn max_concurrency(mut self, max_concurrency: u64) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }

    /// Builder-style: set the initial timestamp for time-based cores
    pub fn start(mut self, start_ms: Millis) -> Self {
        self.start_ms = Some(start_ms);
        self
    }

    fn window_or_default(&self) -> Millis {
        self.window_size_ms.unwrap_or(DEFAULT_WINDOW_MS)
    }

    fn capacity_or_limit(&self) -> f64 {
        self.capacity.unwrap_or(self.limit as f64)
    }

    fn rate_or_limit(&self) -> f64 {
        self.rate_per_second.unwrap_or(self.limit as f64)
    }

    fn start_or_zero(&self) -> Millis {
        self.start_ms.unwrap_or(0)
    }
}

/// One of the six algorithm cores.
#[derive(Debug, Clone)]
pub enum Algorithm {
    FixedWindow(FixedWindowCounterCore),
    SlidingLog(SlidingWindowLogCore),
    SlidingCounter(SlidingWindowCounterCore),
    TokenBucket(TokenBucketCore),
    LeakyBucket(LeakyBucketCore),
    Concurrency(ConcurrencyLimiterCore),
}

/// Snapshot of whichever core an [`Algorithm`] holds.
///
/// Serializes with a kebab-case `type` tag naming the algorithm, and every
/// field name in camelCase (`activeCount`, `isWindowExpired`), the same
/// convention [`AlgorithmConfig`] and [`RequestEvent`](crate::RequestEvent)
/// use, so a display layer reads back the names it sends.
///
/// ```rust
/// use rate_sim_core::{create_algorithm, AlgorithmConfig, RateLimitAlgorithm};
///
/// let algorithm = create_algorithm("concurrency", &AlgorithmConfig::new(2)).unwrap();
/// let json = serde_json::to_string(&algorithm.state(0)).unwrap();
/// assert_eq!(json, r#"{"type":"concurrency","activeCount":0,"maxConcurrency":2}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AlgorithmSnapshot {
    FixedWindow(FixedWindowState),
    SlidingLog(SlidingWindowLogState),
    SlidingCounter(SlidingWindowCounterState),
    TokenBucket(TokenBucketState),
    LeakyBucket(LeakyBucketState),
    Concurrency(ConcurrencyState),
}

/// Generates `From<Core> for Algorithm` for each core.
macro_rules! impl_from_core {
    ($($variant:ident => $core:ty),+ $(,)?) => {
        $(
            impl From<$core> for Algorithm {
                #[inline]
                fn from(core: $core) -> Self {
                    Algorithm::$variant(core)
                }
            }
        )+
    };
}

impl_from_core! {
    FixedWindow => FixedWindowCounterCore,
    SlidingLog => SlidingWindowLogCore,
    SlidingCounter => SlidingWindowCounterCore,
    TokenBucket => TokenBucketCore,
    LeakyBucket => LeakyBucketCore,
    Concurrency => ConcurrencyLimiterCore,
}

impl Algorithm {
    /// Builds the core for `kind` from `config`, applying the fallbacks
    /// documented on [`AlgorithmConfig`].
    pub fn build(kind: AlgorithmKind, config: &AlgorithmConfig) -> ConfigResult<Self> {
        let algorithm = match kind {
            AlgorithmKind::FixedWindow => {
                FixedWindowCounterCore::new(config.limit, config.window_or_default())?.into()
            }
            AlgorithmKind::SlidingLog => {
                SlidingWindowLogCore::new(config.limit, config.window_or_default())?.into()
            }
            AlgorithmKind::SlidingCounter => SlidingWindowCounterCore::with_start(
                config.limit,
                config.window_or_default(),
                config.start_or_zero(),
            )?
            .into(),
            AlgorithmKind::TokenBucket => TokenBucketCore::with_start(
                config.capacity_or_limit(),
                config.rate_or_limit(),
                config.start_or_zero(),
            )?
            .into(),
            AlgorithmKind::LeakyBucket => LeakyBucketCore::with_start(
                config.capacity_or_limit(),
                config.rate_or_limit(),
                config.start_or_zero(),
            )?
            .into(),
            AlgorithmKind::Concurrency => {
                ConcurrencyLimiterCore::new(config.max_concurrency.unwrap_or(config.limit))?.into()
            }
        };
        debug!(%kind, ?config, "algorithm created");
        Ok(algorithm)
    }

    /// Frees a concurrency slot.
    ///
    /// Returns `false` without doing anything for cores that hold no slots.
    pub fn release(&mut self) -> bool {
        match self {
            Algorithm::Concurrency(core) => {
                core.release();
                true
            }
            _ => false,
        }
    }
}

impl RateLimitAlgorithm for Algorithm {
    type State = AlgorithmSnapshot;

    fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::FixedWindow(core) => core.kind(),
            Algorithm::SlidingLog(core) => core.kind(),
            Algorithm::SlidingCounter(core) => core.kind(),
            Algorithm::TokenBucket(core) => core.kind(),
            Algorithm::LeakyBucket(core) => core.kind(),
            Algorithm::Concurrency(core) => core.kind(),
        }
    }

    fn admit(&mut self, now: Millis) -> AdmissionResult {
        match self {
            Algorithm::FixedWindow(core) => core.admit(now),
            Algorithm::SlidingLog(core) => core.admit(now),
            Algorithm::SlidingCounter(core) => core.admit(now),
            Algorithm::TokenBucket(core) => core.admit(now),
            Algorithm::LeakyBucket(core) => core.admit(now),
            Algorithm::Concurrency(core) => core.admit(now),
        }
    }

    fn state(&self, now: Millis) -> AlgorithmSnapshot {
        match self {
            Algorithm::FixedWindow(core) => AlgorithmSnapshot::FixedWindow(core.state(now)),
            Algorithm::SlidingLog(core) => AlgorithmSnapshot::SlidingLog(core.state(now)),
            Algorithm::SlidingCounter(core) => AlgorithmSnapshot::SlidingCounter(core.state(now)),
            Algorithm::TokenBucket(core) => AlgorithmSnapshot::TokenBucket(core.state(now)),
            Algorithm::LeakyBucket(core) => AlgorithmSnapshot::LeakyBucket(core.state(now)),
            Algorithm::Concurrency(core) => AlgorithmSnapshot::Concurrency(core.state(now)),
        }
    }
}

impl AlgorithmSnapshot {
    /// What is currently occupying the limiter: requests counted in the
    /// window, the weighted estimate, tokens left, water level, or active
    /// slots.
    pub fn current_usage(&self) -> f64 {
        match self {
            AlgorithmSnapshot::FixedWindow(s) => s.count as f64,
            AlgorithmSnapshot::SlidingLog(s) => s.count as f64,
            AlgorithmSnapshot::SlidingCounter(s) => s.estimated_count.max(0.0),
            AlgorithmSnapshot::TokenBucket(s) => s.tokens,
            AlgorithmSnapshot::LeakyBucket(s) => s.water_level,
            AlgorithmSnapshot::Concurrency(s) => s.active_count as f64,
        }
    }

    /// The ceiling `current_usage` is measured against.
    pub fn ceiling(&self) -> f64 {
        match self {
            AlgorithmSnapshot::FixedWindow(s) => s.limit as f64,
            AlgorithmSnapshot::SlidingLog(s) => s.limit as f64,
            AlgorithmSnapshot::SlidingCounter(s) => s.limit as f64,
            AlgorithmSnapshot::TokenBucket(s) => s.capacity,
            AlgorithmSnapshot::LeakyBucket(s) => s.capacity,
            AlgorithmSnapshot::Concurrency(s) => s.max_concurrency as f64,
        }
    }

    /// `current_usage` as a percentage of `ceiling`, clamped to `0..=100`.
    pub fn fill_percentage(&self) -> f64 {
        (self.current_usage() / self.ceiling() * 100.0).clamp(0.0, 100.0)
    }
}

/// Builds an algorithm core from a string discriminator.
///
/// Recognised kinds are `fixed-window`, `sliding-log`, `sliding-counter`,
/// `token-bucket`, `leaky-bucket` and `concurrency`.
///
/// # Errors
///
/// * [`ConfigError::UnknownAlgorithm`] for any other discriminator
/// * [`ConfigError::InvalidParameter`] if a resolved parameter is not positive
///
/// # Example
///
/// ```rust
/// use rate_sim_core::{create_algorithm, AlgorithmConfig, AlgorithmKind, RateLimitAlgorithm};
///
/// let mut algorithm = create_algorithm("token-bucket", &AlgorithmConfig::new(10).rate(2.0)).unwrap();
/// assert_eq!(algorithm.kind(), AlgorithmKind::TokenBucket);
/// assert!(algorithm.admit(0).is_allowed());
///
/// assert!(create_algorithm("round-robin", &AlgorithmConfig::new(10)).is_err());
/// ```
pub fn create_algorithm(kind: &str, config: &AlgorithmConfig) -> ConfigResult<Algorithm> {
    Algorithm::build(kind.parse()?, config)
}
