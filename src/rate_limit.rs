//! Core trait for rate limiter algorithms.
//!
//! This module defines the shape shared by every algorithm core. It allows the
//! fixed window, sliding window, bucket and concurrency cores to be driven
//! interchangeably by a simulation loop or a display layer.

use crate::factory::AlgorithmKind;
use crate::types::{AdmissionResult, Millis};

/// The core trait implemented by all rate limiter algorithms.
///
/// Cores are plain single-threaded state machines: `admit` takes `&mut self`
/// and the state read is a pure projection over `&self`. Sharing a core
/// across threads needs external synchronization.
pub trait RateLimitAlgorithm {
    /// Algorithm-specific read-only view of the internal state.
    type State;

    /// Which algorithm this core implements.
    fn kind(&self) -> AlgorithmKind;

    /// Decides whether a request arriving at `now` is admitted.
    ///
    /// Callers must pass non-decreasing timestamps to a given instance.
    /// Rejection is reported through the returned value, never as an error.
    fn admit(&mut self, now: Millis) -> AdmissionResult;

    /// Returns a snapshot of the internal state as seen at `now`.
    ///
    /// Never mutates the core: calling it twice in a row returns equal values.
    /// Cores whose state does not depend on elapsed window time ignore `now`
    /// and report the state as of the last `admit`/`release`.
    fn state(&self, now: Millis) -> Self::State;
}
