//! Error types for the VFX archive crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with VFX archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A backing package could not be opened or read.
    #[error("failed to read package {path}: {source}")]
    PackageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Common library error (truncated data, bad strings).
    #[error("{0}")]
    Common(#[from] vfx_common::Error),

    /// Version or compression tag not recognised.
    #[error("unsupported VFX format: version {version}, compression {compression}")]
    UnsupportedFormat { version: u32, compression: u32 },

    /// Obfuscated string with a zero length header.
    #[error("invalid obfuscated string at offset {offset:#x}")]
    InvalidString { offset: usize },

    /// Entry table violates the tree layout.
    #[error("invalid entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    /// Entry index past the end of the table.
    #[error("entry index {index} out of range ({count} entries)")]
    EntryOutOfRange { index: usize, count: usize },

    /// Extraction requested for a folder entry.
    #[error("entry {0} is a folder, not a file")]
    NotAFile(usize),

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Decompressed length differs from the declared size.
    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Broad failure categories, for callers that branch on the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File open or read failure.
    IoError,
    /// Version or compression tag not recognised.
    UnsupportedFormat,
    /// Data ended before a fixed-size read completed.
    TruncatedData,
    /// Structurally invalid index or payload.
    CorruptData,
    /// Caller passed an index that cannot be used for the operation.
    InvalidInput,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::PackageRead { .. } => ErrorKind::IoError,
            Error::Common(e) if e.is_eof() => ErrorKind::TruncatedData,
            Error::Common(_) => ErrorKind::CorruptData,
            Error::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Error::InvalidString { .. }
            | Error::InvalidEntry { .. }
            | Error::Decompression(_)
            | Error::SizeMismatch { .. } => ErrorKind::CorruptData,
            Error::EntryOutOfRange { .. } | Error::NotAFile(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Result type for VFX operations.
pub type Result<T> = std::result::Result<T, Error>;
