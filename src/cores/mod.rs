//! Core rate limiting algorithm implementations.
//!
//! Each core is a small, single-threaded state machine driven by caller
//! supplied millisecond timestamps. Cores share nothing with each other.
//!
//! # Available Algorithms
//!
//! - **[`FixedWindowCounterCore`]** - Counts requests per window, resetting when a window expires
//! - **[`SlidingWindowLogCore`]** - Exact sliding window from a log of admitted timestamps
//! - **[`SlidingWindowCounterCore`]** - Weighted two-window approximation of a sliding window
//! - **[`TokenBucketCore`]** - Allows bursts up to capacity while maintaining average rate
//! - **[`LeakyBucketCore`]** - Fills per request, drains at a constant rate
//! - **[`ConcurrencyLimiterCore`]** - Caps in-flight requests, not time based
//!
//! # Algorithm Comparison
//!
//! | Algorithm | Memory Usage | Accuracy | Burst Handling | Use Case |
//! |-----------|-------------|----------|----------------|----------|
//! | Fixed Window | Low | Medium | Boundary bursts | Simple counting |
//! | Sliding Log | Grows with traffic | Exact | Smooth | Accurate limiting |
//! | Sliding Counter | Low | Good | Smooth | Efficient approximation |
//! | Token Bucket | Low | High | Allow bursts | Bursty traffic |
//! | Leaky Bucket | Low | High | Absorb then smooth | Constant outflow |
//! | Concurrency | Low | Exact | n/a | Long-running work |

pub mod fixed_window_counter_core;
pub use fixed_window_counter_core::{
    FixedWindowCounterCore, FixedWindowCounterCoreConfig, FixedWindowState,
};

pub mod sliding_window_log_core;
pub use sliding_window_log_core::{
    SlidingWindowLogCore, SlidingWindowLogCoreConfig, SlidingWindowLogState,
};

pub mod sliding_window_counter_core;
pub use sliding_window_counter_core::{
    SlidingWindowCounterCore, SlidingWindowCounterCoreConfig, SlidingWindowCounterState,
};

pub mod token_bucket_core;
pub use token_bucket_core::{TokenBucketCore, TokenBucketCoreConfig, TokenBucketState};

pub mod leaky_bucket_core;
pub use leaky_bucket_core::{LeakyBucketCore, LeakyBucketCoreConfig, LeakyBucketState};

pub mod concurrency_limiter_core;
pub use concurrency_limiter_core::{
    ConcurrencyLimiterCore, ConcurrencyLimiterCoreConfig, ConcurrencyState,
};
