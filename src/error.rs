//! Error types for the selection engine.
//!
//! Only genuinely invalid API usage is an error: bad buffer dimensions,
//! mismatched mask sizes, out-of-range seed points, negative tolerances.
//! Degenerate interactive input (an empty stroke, a zero-tolerance fill,
//! zero detected regions) always produces a valid empty result instead.

use thiserror::Error;

/// Errors reported for invalid engine API usage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Buffer construction with inconsistent dimensions.
    #[error("invalid buffer dimensions: {width}x{height}x{channels} does not match {len} bytes")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
        len: usize,
    },

    /// Unsupported channel count (only RGB and RGBA buffers are accepted).
    #[error("unsupported channel count: {0} (expected 3 or 4)")]
    UnsupportedChannels(usize),

    /// A coordinate handed to the API lies outside the buffer.
    #[error("coordinate ({x}, {y}) outside {width}x{height} buffer")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Two buffers/masks that must share dimensions do not.
    #[error("dimension mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    /// A numeric parameter outside its documented range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
