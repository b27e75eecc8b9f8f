//! Shared value types for admission decisions and timestamps.
//!
//! Every core is driven by caller-supplied timestamps expressed as [`Millis`].
//! The core never reads a clock on its own, so the same sequence of
//! timestamps always produces the same sequence of decisions.

use core::fmt;

use serde::{Serialize, Serializer};

/// Timestamp or duration in milliseconds on the caller's virtual clock.
pub type Millis = u64;

/// Why a request was turned away.
///
/// A rejection is a normal outcome of [`admit`](crate::RateLimitAlgorithm::admit),
/// not an error. The reason exists so a display layer can say what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The fixed window or sliding log already holds `limit` requests.
    WindowLimitExceeded,
    /// The token bucket has less than one whole token.
    NoTokensAvailable,
    /// The leaky bucket is already at capacity.
    BucketOverflow,
    /// The weighted sliding window estimate reached `limit`.
    SlidingWindowLimitExceeded,
    /// Every concurrency slot is taken.
    MaxConcurrencyReached,
}

impl RejectReason {
    /// Human readable reason text.
    pub fn as_str(&self) -> &'static str {
        use RejectReason::*;
        match self {
            WindowLimitExceeded => "window limit exceeded",
            NoTokensAvailable => "no tokens available",
            BucketOverflow => "bucket overflow",
            SlidingWindowLimitExceeded => "sliding window limit exceeded",
            MaxConcurrencyReached => "max concurrency reached",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of a single admission call.
///
/// The reason is present exactly when the request was rejected; the
/// constructors are the only way to build one, so that always holds.
///
/// # Example
///
/// ```rust
/// use rate_sim_core::{AdmissionResult, RejectReason};
///
/// let ok = AdmissionResult::allowed();
/// assert!(ok.is_allowed());
/// assert_eq!(ok.reason(), None);
///
/// let denied = AdmissionResult::rejected(RejectReason::BucketOverflow);
/// assert!(!denied.is_allowed());
/// assert_eq!(denied.reason().map(|r| r.as_str()), Some("bucket overflow"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResult {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<RejectReason>,
}

impl AdmissionResult {
    /// The request was admitted.
    #[inline]
    pub fn allowed() -> Self {
        Self { allowed: true, reason: None }
    }

    /// The request was rejected for `reason`.
    #[inline]
    pub fn rejected(reason: RejectReason) -> Self {
        Self { allowed: false, reason: Some(reason) }
    }

    #[inline]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    #[inline]
    pub fn reason(&self) -> Option<RejectReason> {
        self.reason
    }
}
