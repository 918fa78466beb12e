use std::num::NonZero;

use thiserror::Error;
use tracing::debug;

/// Errors raised before any computation begins.
///
/// Numerically undefined results (insufficient warm-up, zero ranges) are
/// never errors: they surface as `NaN` in the output series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A numeric parameter violates its structural precondition
    /// (non-positive window, step ≥ maximum acceleration, non-positive
    /// multiplier, missing required builder field).
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as used by the config builder.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two series that must be index-aligned differ in length.
    #[error("shape mismatch: `{name}` has {actual} values, expected {expected}")]
    ShapeMismatch {
        /// Name of the offending series.
        name: &'static str,
        /// Length of the reference series.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// A moving-average identifier did not name any known method.
    #[error("unknown moving average method `{0}`")]
    UnknownMethod(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug!(name, %reason, "rejected parameter");
        Self::InvalidParameter { name, reason }
    }
}

/// Rejects a zero window length coming from a raw `usize` entry point.
pub(crate) fn window(name: &'static str, length: usize) -> Result<NonZero<usize>> {
    NonZero::new(length).ok_or_else(|| Error::invalid(name, "must be at least 1"))
}

/// Fails with [`Error::ShapeMismatch`] unless `actual == expected`.
pub(crate) fn aligned(name: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        debug!(name, expected, actual, "rejected misaligned series");
        Err(Error::ShapeMismatch {
            name,
            expected,
            actual,
        })
    }
}

/// Unwraps a builder field that has no default.
pub(crate) fn required<T>(name: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| Error::invalid(name, "is required"))
}
