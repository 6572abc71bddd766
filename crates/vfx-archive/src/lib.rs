//! VFX archive reader for Metro game files.
//!
//! A VFX archive is a single index file plus one or more package files
//! stored next to it. The index holds:
//!
//! - a format header (version 3, LZ4 compression)
//! - the package table
//! - a flat, pre-order table of files and folders with XOR-obfuscated names
//!
//! Folders own a contiguous range of the entry table instead of pointing at
//! their children, so every tree query here is an index-range scan.
//!
//! # Example
//!
//! ```no_run
//! use vfx_archive::{SubRange, VfxArchive};
//!
//! let archive = VfxArchive::open("content.vfx")?;
//!
//! if let Some(index) = archive.find_file("textures\\wall.dds", None) {
//!     let data = archive.extract(index, SubRange::ALL)?;
//!     println!("{} bytes", data.len());
//! }
//! # Ok::<(), vfx_archive::Error>(())
//! ```

mod archive;
mod decompress;
mod entry;
mod error;
mod extract;
mod index;
mod string;

pub use archive::{VfxArchive, Walk, PATH_SEPARATOR};
pub use decompress::{Decompressor, Lz4Decompressor};
pub use entry::{Entry, EntryKind, Package, FLAG_FILE};
pub use error::{Error, ErrorKind, Result};
pub use extract::{FileView, SubRange};
pub use index::{COMPRESSION_LZ4, VFX_VERSION};
