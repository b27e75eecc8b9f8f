//! Deterministic rate limiting algorithm cores for simulation and visualization.
//!
//! This library implements six request admission algorithms as small,
//! single-threaded state machines. Each one is driven entirely by the
//! millisecond timestamps its caller passes in, and each one can report its
//! internal state at any time without side effects. That makes the cores
//! suitable for driving animations, step-by-step walkthroughs, and
//! reproducible tests.
//!
//! # Quick Start
//!
//! ```rust
//! use rate_sim_core::{create_algorithm, AlgorithmConfig, RateLimitAlgorithm};
//!
//! // 10 requests per 5 second window
//! let mut limiter = create_algorithm("fixed-window", &AlgorithmConfig::new(10).window(5_000)).unwrap();
//!
//! let result = limiter.admit(0);
//! match result.reason() {
//!     None => println!("Request allowed"),
//!     Some(reason) => println!("Request rejected: {}", reason),
//! }
//!
//! let state = limiter.state(0);
//! println!("{:.0}% full", state.fill_percentage());
//! ```
//!
//! # Available Rate Limiting Algorithms
//!
//! ## [Fixed Window Counter](cores::FixedWindowCounterCore)
//! Simple time-window based counting:
//! ```rust
//! # use rate_sim_core::cores::FixedWindowCounterCore;
//! let limiter = FixedWindowCounterCore::new(100, 60_000).unwrap(); // 100 requests per minute
//! ```
//!
//! ## [Sliding Window Log](cores::SlidingWindowLogCore)
//! Exact sliding window from a log of admitted timestamps:
//! ```rust
//! # use rate_sim_core::cores::SlidingWindowLogCore;
//! let limiter = SlidingWindowLogCore::new(5, 10_000).unwrap();
//! ```
//!
//! ## [Sliding Window Counter](cores::SlidingWindowCounterCore)
//! Memory-efficient weighted approximation using only two windows:
//! ```rust
//! # use rate_sim_core::cores::SlidingWindowCounterCore;
//! let limiter = SlidingWindowCounterCore::new(100, 60_000).unwrap();
//! ```
//!
//! ## [Token Bucket](cores::TokenBucketCore)
//! Allows bursts up to capacity while maintaining average rate:
//! ```rust
//! # use rate_sim_core::cores::TokenBucketCore;
//! let limiter = TokenBucketCore::new(10.0, 2.0).unwrap(); // 2 tokens per second
//! ```
//!
//! ## [Leaky Bucket](cores::LeakyBucketCore)
//! Fills per request and drains at a constant rate:
//! ```rust
//! # use rate_sim_core::cores::LeakyBucketCore;
//! let limiter = LeakyBucketCore::new(10.0, 2.0).unwrap(); // drain 2 per second
//! ```
//!
//! ## [Concurrency Limiter](cores::ConcurrencyLimiterCore)
//! Caps in-flight requests; slots are freed with `release()`:
//! ```rust
//! # use rate_sim_core::cores::ConcurrencyLimiterCore;
//! let limiter = ConcurrencyLimiterCore::new(3).unwrap();
//! ```
//!
//! # Core Concepts
//!
//! ## Time Representation
//! All algorithms take time as [`Millis`] on the caller's virtual clock. No
//! core reads the wall clock. Timestamps passed to one instance must not go
//! backwards; the bucket cores treat a regressed timestamp as zero elapsed
//! time.
//!
//! ## Decisions and Errors
//! [`RateLimitAlgorithm::admit`] returns an [`AdmissionResult`]. A rejection
//! carries a [`RejectReason`] and is a normal outcome, not an error.
//! [`ConfigError`] is only returned when building a core with a
//! non-positive parameter or asking the factory for an unknown kind.
//!
//! ## Thread Safety
//! Cores are plain values mutated through `&mut self`. Sharing one between
//! threads requires wrapping it in a lock.

pub mod cores;
pub mod error;
pub mod factory;
pub mod rate_limit;
pub mod simulation;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use factory::{
    create_algorithm, Algorithm, AlgorithmConfig, AlgorithmKind, AlgorithmSnapshot,
    DEFAULT_WINDOW_MS,
};
pub use rate_limit::RateLimitAlgorithm;
pub use simulation::{RequestEvent, Simulation, SimulationStats};
pub use types::{AdmissionResult, Millis, RejectReason};
