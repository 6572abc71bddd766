//! Packages and file/folder entries.

use std::ops::Range;

/// Low flag bit set on file entries; folders leave it clear.
pub const FLAG_FILE: u16 = 0x0001;

/// A backing data package referenced by file entries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Package {
    /// File name of the package, relative to the index directory.
    pub name: String,
    /// Level tags attached to the package.
    pub levels: Vec<String>,
    /// Chunk identifier.
    pub chunk: u32,
}

/// Variant-specific entry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EntryKind {
    /// File stored in a package.
    File {
        /// Index into the archive's package table.
        package: u16,
        /// Byte offset within the package.
        offset: u32,
        size_uncompressed: u32,
        size_compressed: u32,
    },
    /// Folder owning the contiguous range `[first_file, first_file + num_files)`.
    Folder { num_files: u16, first_file: u32 },
}

/// A file or folder in the flat, pre-order entry table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Entry {
    /// Position of this entry in the table.
    pub index: usize,
    /// Raw flags; see [`FLAG_FILE`].
    pub flags: u16,
    /// Decoded name (a single path component).
    pub name: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: EntryKind,
}

impl Entry {
    #[inline]
    pub fn is_file(&self) -> bool {
        self.flags & FLAG_FILE != 0
    }

    #[inline]
    pub fn is_folder(&self) -> bool {
        !self.is_file()
    }

    /// Indices contained by this folder. Empty for files.
    #[inline]
    pub fn children(&self) -> Range<usize> {
        match self.kind {
            EntryKind::Folder {
                num_files,
                first_file,
            } => {
                let first = first_file as usize;
                first..first + num_files as usize
            }
            EntryKind::File { .. } => 0..0,
        }
    }

    /// Whether `index` falls inside this folder's containment range.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.children().contains(&index)
    }

    /// Uncompressed size for files, zero for folders.
    #[inline]
    pub fn size(&self) -> u64 {
        match self.kind {
            EntryKind::File {
                size_uncompressed, ..
            } => size_uncompressed as u64,
            EntryKind::Folder { .. } => 0,
        }
    }

    /// Whether the payload needs decompression.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        matches!(
            self.kind,
            EntryKind::File {
                size_uncompressed,
                size_compressed,
                ..
            } if size_uncompressed != size_compressed
        )
    }

    /// Owning package index for files.
    #[inline]
    pub fn package(&self) -> Option<usize> {
        match self.kind {
            EntryKind::File { package, .. } => Some(package as usize),
            EntryKind::Folder { .. } => None,
        }
    }

    /// Get the file extension (text after the last `.`), if any.
    pub fn extension(&self) -> Option<&str> {
        let dot = self.name.rfind('.')?;
        Some(&self.name[dot + 1..]).filter(|ext| !ext.is_empty())
    }
}
