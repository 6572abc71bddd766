//! VFX - Metro game archive reading library.
//!
//! This crate provides a unified interface to the VFX crates:
//!
//! - [`vfx_common`] - Binary reading and GUIDs
//! - [`vfx_archive`] - Index parsing, path resolution and extraction
//!
//! # Example
//!
//! ```no_run
//! use vfx::prelude::*;
//!
//! let archive = VfxArchive::open("content.vfx")?;
//!
//! for index in archive.find_files(archive.root().index, ".dds", true) {
//!     let data = archive.extract(index, SubRange::ALL)?;
//!     println!("{}: {} bytes", archive.entry_path(index).unwrap_or_default(), data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use vfx_archive as archive;
pub use vfx_common as common;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use vfx_archive::{Entry, EntryKind, FileView, Package, SubRange, VfxArchive};
    pub use vfx_common::{BinaryReader, VfxGuid};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
