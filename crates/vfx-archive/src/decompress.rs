//! Decompression of package payloads.

use crate::{Error, Result};

/// A block decompressor for compressed file entries.
///
/// Implementations return whatever the codec produced; the caller compares
/// the length against the size declared in the index.
pub trait Decompressor {
    fn decompress(&self, data: &[u8], uncompressed_size: usize) -> Result<Vec<u8>>;
}

/// LZ4 block decompression, the codec used by version 3 indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Decompressor;

impl Decompressor for Lz4Decompressor {
    fn decompress(&self, data: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        let size = i32::try_from(uncompressed_size).map_err(|_| {
            Error::Decompression(format!("LZ4 size overflow: {}", uncompressed_size))
        })?;

        lz4::block::decompress(data, Some(size)).map_err(|e| Error::Decompression(e.to_string()))
    }
}
