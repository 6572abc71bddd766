//! Error types for vfx-common.

use thiserror::Error;

/// Common error type for VFX operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// A window was requested outside the underlying buffer.
    #[error("window {offset}+{length} exceeds buffer of {len} bytes")]
    WindowOutOfBounds {
        offset: usize,
        length: usize,
        len: usize,
    },

    /// Invalid GUID format.
    #[error("invalid GUID format: {0}")]
    InvalidGuid(String),

    /// Missing null terminator in string.
    #[error("string missing null terminator")]
    MissingNullTerminator,
}

impl Error {
    /// Whether the error means the data ran out before a read completed.
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::UnexpectedEof { .. } | Error::MissingNullTerminator)
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
