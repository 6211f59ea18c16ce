//! Error types for cursor operations.

use thiserror::Error;

/// Errors raised while reading or writing a serialized buffer.
#[derive(Debug, Error)]
pub enum BinaryError {
    /// Read past the end of the buffer.
    #[error("buffer underrun at offset {offset}: needed {needed} bytes, {available} available")]
    BufferUnderrun {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Length prefix is negative.
    #[error("negative length {length} at offset {offset}")]
    NegativeLength { offset: usize, length: i32 },

    /// Length does not fit the 32-bit prefix.
    #[error("length {length} does not fit a 32-bit prefix")]
    LengthOverflow { length: usize },

    /// Path id does not fit the 32-bit layout of pre-5.0 buffers.
    #[error("path id {path_id} does not fit a 32-bit reference")]
    PathIdOverflow { path_id: i64 },

    /// String payload is not UTF-8.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Alignment is not a power of two.
    #[error("alignment {alignment} is not a power of two")]
    InvalidAlignment { alignment: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cursor operations.
pub type Result<T> = std::result::Result<T, BinaryError>;

impl BinaryError {
    /// Byte offset the error refers to, when it has one.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::BufferUnderrun { offset, .. }
            | Self::NegativeLength { offset, .. }
            | Self::InvalidUtf8 { offset } => Some(*offset),
            Self::LengthOverflow { .. }
            | Self::PathIdOverflow { .. }
            | Self::InvalidAlignment { .. }
            | Self::Io(_) => None,
        }
    }
}
