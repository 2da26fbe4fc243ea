use std::collections::TryReserveError;

use thiserror::Error;

use crate::Width;

/// Result type returned by fallible bitmap operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by bitmap operations.
///
/// Single-value operations on [`Bitmap`](crate::Bitmap) and [`Bitmap64`](crate::Bitmap64)
/// never fail; errors only come from decoding, fallible allocation, and the width-tagged
/// [`AnyBitmap`](crate::AnyBitmap) surface.
#[derive(Debug, Error)]
pub enum Error {
    /// A buffer could not be allocated.
    #[error("allocation failed: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// A serialized payload was rejected.
    #[error("malformed bitmap payload: {0}")]
    Format(#[from] FormatError),

    /// The operands of an operation have different widths.
    #[error("bitmap width mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Width, found: Width },

    /// A value does not fit the width of the bitmap it was given to.
    #[error("value {value} does not fit a {width} bitmap")]
    OutOfRange { value: u64, width: Width },
}

/// The reason a portable payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("unknown cookie {0:#010x}")]
    UnknownCookie(u32),

    #[error("container count {0} exceeds the key space")]
    TooManyContainers(u64),

    #[error("container keys are not strictly increasing at container {index}")]
    UnsortedKeys { index: usize },

    #[error("container {index} is empty")]
    EmptyContainer { index: usize },

    #[error("container {index} holds {actual} values but its header declares {declared}")]
    CardinalityMismatch {
        index: usize,
        declared: u64,
        actual: u64,
    },

    #[error("array container {index} is not strictly increasing")]
    UnsortedArray { index: usize },

    #[error("run container {index} has overlapping, unsorted or overflowing runs")]
    InvalidRuns { index: usize },

    #[error("bitmap for high key {key:#x} is empty")]
    EmptyBitmap { key: u32 },
}
