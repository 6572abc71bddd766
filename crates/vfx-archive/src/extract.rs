//! File extraction from backing packages.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Deref;
use std::path::Path;

use vfx_common::BinaryReader;

use crate::archive::VfxArchive;
use crate::decompress::{Decompressor, Lz4Decompressor};
use crate::entry::EntryKind;
use crate::{Error, Result};

/// A byte window over a file's uncompressed content.
///
/// `None` for `offset` means the start, `None` for `length` means up to the
/// end of the file. Both are clamped to the file size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubRange {
    pub offset: Option<usize>,
    pub length: Option<usize>,
}

impl SubRange {
    /// The whole file.
    pub const ALL: Self = Self {
        offset: None,
        length: None,
    };

    pub const fn new(offset: usize, length: usize) -> Self {
        Self {
            offset: Some(offset),
            length: Some(length),
        }
    }

    /// Everything from `offset` to the end.
    pub const fn from_offset(offset: usize) -> Self {
        Self {
            offset: Some(offset),
            length: None,
        }
    }

    /// Clamp against a file of `size` bytes, returning `(start, len)`.
    pub fn clamp(&self, size: usize) -> (usize, usize) {
        let start = self.offset.unwrap_or(0).min(size);
        let available = size - start;
        let len = self.length.map_or(available, |l| l.min(available));
        (start, len)
    }
}

/// Extracted file content restricted to a window.
///
/// Owns the full uncompressed buffer but only exposes the window. Reading
/// through [`Read`]/[`Seek`] uses positions relative to the window start.
#[derive(Debug, Clone)]
pub struct FileView {
    data: Vec<u8>,
    start: usize,
    len: usize,
    position: usize,
}

impl FileView {
    fn new(data: Vec<u8>, start: usize, len: usize) -> Self {
        Self {
            data,
            start,
            len,
            position: 0,
        }
    }

    /// The visible bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..self.start + self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start of the window within the file.
    #[inline]
    pub fn offset(&self) -> usize {
        self.start
    }

    /// Uncompressed size of the whole file.
    #[inline]
    pub fn file_size(&self) -> usize {
        self.data.len()
    }

    /// A binary cursor bounded to the window.
    pub fn reader(&self) -> Result<BinaryReader<'_>> {
        Ok(BinaryReader::new(&self.data).window(self.start, self.len)?)
    }

    /// Take the visible bytes, avoiding a copy when the window is the file.
    pub fn into_vec(mut self) -> Vec<u8> {
        if self.start == 0 && self.len == self.data.len() {
            self.data
        } else {
            self.data.truncate(self.start + self.len);
            self.data.drain(..self.start);
            self.data
        }
    }
}

impl Deref for FileView {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for FileView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Read for FileView {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.as_slice()[self.position.min(self.len)..];
        let count = remaining.len().min(buf.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        Ok(count)
    }
}

impl Seek for FileView {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p as i128),
            SeekFrom::End(d) => Some(self.len as i128 + d as i128),
            SeekFrom::Current(d) => Some(self.position as i128 + d as i128),
        }
        .filter(|&p| p >= 0)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seek before start of view"))?;

        self.position = usize::try_from(target)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "seek position overflow"))?;
        Ok(self.position as u64)
    }
}

impl VfxArchive {
    /// Extract a file's content, decompressing with LZ4 when needed.
    pub fn extract(&self, index: usize, range: SubRange) -> Result<FileView> {
        self.extract_with(index, range, &Lz4Decompressor)
    }

    /// Extract a file's content with a caller-provided decompressor.
    pub fn extract_with(
        &self,
        index: usize,
        range: SubRange,
        decompressor: &dyn Decompressor,
    ) -> Result<FileView> {
        let entry = self.entry(index).ok_or(Error::EntryOutOfRange {
            index,
            count: self.entry_count(),
        })?;

        let EntryKind::File {
            package,
            offset,
            size_uncompressed,
            size_compressed,
        } = entry.kind
        else {
            return Err(Error::NotAFile(index));
        };

        // Package indices are checked at load time.
        let package = &self.packages()[package as usize];
        let path = self.base_dir().join(&package.name);
        let size = size_uncompressed as usize;

        let raw = read_package_bytes(&path, offset as u64, size_compressed as usize)
            .map_err(|source| {
                log::error!("failed to read {} from {}: {}", entry.name, path.display(), source);
                Error::PackageRead {
                    path: path.clone(),
                    source,
                }
            })?;

        let data = if size_compressed == size_uncompressed {
            raw
        } else {
            let data = decompressor.decompress(&raw, size)?;
            if data.len() != size {
                log::error!(
                    "{}: decompressed {} bytes, expected {}",
                    entry.name,
                    data.len(),
                    size
                );
                return Err(Error::SizeMismatch {
                    expected: size,
                    actual: data.len(),
                });
            }
            data
        };

        let (start, len) = range.clamp(size);
        log::debug!(
            "extracted {} ({} bytes, window {}+{})",
            entry.name,
            size,
            start,
            len
        );

        Ok(FileView::new(data, start, len))
    }
}

fn read_package_bytes(path: &Path, offset: u64, length: usize) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;

    let mut buffer = vec![0u8; length];
    file.read_exact(&mut buffer)?;
    Ok(buffer)
}
