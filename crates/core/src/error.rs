//! Error types for U-Strip.

use crate::geometry::Coord;
use thiserror::Error;

/// Result type alias for U-Strip operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during packing.
///
/// A width at which no packing was found is not an error: the width
/// optimizer treats it as a negative probe.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid rectangle provided.
    #[error("Invalid rectangle: {0}")]
    InvalidRectangle(String),

    /// Parameters the solver does not handle (free height, oversized pool).
    #[error("Unsupported parameters: {0}")]
    UnsupportedParameters(String),

    /// The skyline no longer covers the full height.
    #[error("Skyline invariant violated: segment lengths sum to {actual}, expected {expected}")]
    InvariantViolation {
        /// The global height.
        expected: Coord,
        /// Sum of segment lengths found.
        actual: Coord,
    },

    /// No packing found at any width the search was allowed to try.
    #[error("No valid placement found: {0}")]
    NoPlacement(String),

    /// Computation cancelled before any solution was recorded.
    #[error("Computation cancelled")]
    Cancelled,

    /// Timeout exceeded before any solution was recorded.
    #[error("Timeout exceeded after {0}ms")]
    Timeout(u64),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true for faults that indicate a defect rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. } | Self::Internal(_))
    }
}
