//! error.rs
//! Configuration and factory errors.
//!
//! Rejected requests are not errors and never show up here; see
//! [`AdmissionResult`](crate::AdmissionResult) for those.

use thiserror::Error;

/// Error returned when an algorithm cannot be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A numeric parameter is zero, negative, NaN or infinite.
    #[error("invalid {name}: {value} (must be a positive, finite number)")]
    InvalidParameter {
        name: &'static str,
        value: f64,
    },
    /// The factory does not know the requested algorithm.
    #[error("unknown algorithm kind: {0}")]
    UnknownAlgorithm(String),
}

/// Result type for algorithm construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Checks that an integer parameter is non-zero.
pub(crate) fn ensure_positive_count(name: &'static str, value: u64) -> ConfigResult<u64> {
    if value == 0 {
        return Err(ConfigError::InvalidParameter { name, value: 0.0 });
    }
    Ok(value)
}

/// Checks that a real parameter is strictly positive and finite.
pub(crate) fn ensure_positive_real(name: &'static str, value: f64) -> ConfigResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidParameter { name, value });
    }
    Ok(value)
}
