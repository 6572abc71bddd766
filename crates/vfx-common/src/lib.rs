//! Common utilities for VFX archives.
//!
//! This crate provides the foundational types used by the VFX crates:
//!
//! - [`BinaryReader`] - Zero-copy little-endian cursor over byte slices
//! - [`VfxGuid`] - The 16-byte archive identifier

mod error;
mod guid;
mod reader;

pub use error::{Error, Result};
pub use guid::VfxGuid;
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
