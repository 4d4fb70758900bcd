//! Motion error types

use thiserror::Error;

/// Errors raised while building or mounting a motion pipeline.
///
/// Per-frame problems (missing elements, non-finite values) are never
/// errors; they are absorbed where they occur.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A range needs at least one breakpoint
    #[error("range has no breakpoints")]
    EmptyRange,

    /// Input and output breakpoint lists differ in length
    #[error("range has {input} input breakpoints but {output} output values")]
    LengthMismatch { input: usize, output: usize },

    /// A breakpoint or output value is NaN or infinite
    #[error("range value at index {index} is not finite")]
    NonFinite { index: usize },

    /// Input breakpoints must be non-decreasing
    #[error("input breakpoint at index {index} is smaller than the one before it")]
    Decreasing { index: usize },

    /// The pipeline was already unmounted and cannot be mounted again
    #[error("pipeline has been disposed")]
    Disposed,
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
