//! VFX index parsing.
//!
//! Layout (little-endian, no padding):
//!
//! ```text
//! u32      version
//! u32      compression
//! cstring  content version
//! [u8; 16] guid
//! u32      package count
//! u32      entry count
//! u32      reserved
//! package  * package count   (cstring name, u32 n, cstring * n, u32 chunk)
//! entry    * entry count     (u16 flags, variant fields, xor string name)
//! ```

use vfx_common::{BinaryReader, VfxGuid};

use crate::entry::{Entry, EntryKind, Package, FLAG_FILE};
use crate::string::read_xor_string;
use crate::{Error, Result};

/// Index version written by Metro Exodus.
pub const VFX_VERSION: u32 = 3;

/// Compression tag for LZ4 payloads.
pub const COMPRESSION_LZ4: u32 = 1;

/// Parsed contents of an index file, prior to tree setup.
#[derive(Debug)]
pub(crate) struct Index {
    pub content_version: String,
    pub guid: VfxGuid,
    pub reserved: u32,
    pub packages: Vec<Package>,
    pub entries: Vec<Entry>,
    pub folders: Vec<usize>,
}

/// Parse a complete index file.
pub(crate) fn parse_index(data: &[u8]) -> Result<Index> {
    let mut reader = BinaryReader::new(data);

    let version = reader.read_u32()?;
    let compression = reader.read_u32()?;
    log::info!("vfx version = {}, compression = {}", version, compression);

    if version != VFX_VERSION || compression != COMPRESSION_LZ4 {
        return Err(Error::UnsupportedFormat {
            version,
            compression,
        });
    }

    let content_version = reader.read_cstring()?.into_owned();
    let guid: VfxGuid = reader.read_struct()?;
    let package_count = reader.read_u32()? as usize;
    let entry_count = reader.read_u32()? as usize;
    let reserved = reader.read_u32()?;

    log::info!("vfx content version = {}", content_version);
    log::info!("vfx guid = {}", guid);
    log::info!("packages = {}, files = {}", package_count, entry_count);

    // Counts come from the file; cap the reservation by what could fit.
    let mut packages = Vec::with_capacity(package_count.min(reader.remaining()));
    for _ in 0..package_count {
        packages.push(read_package(&mut reader)?);
    }

    let mut entries = Vec::with_capacity(entry_count.min(reader.remaining() / 8));
    let mut folders = Vec::new();
    for index in 0..entry_count {
        let entry = read_entry(&mut reader, index)?;
        if entry.is_folder() {
            folders.push(index);
        }
        entries.push(entry);
    }

    if !reader.is_empty() {
        log::debug!("{} trailing bytes after entry table", reader.remaining());
    }

    validate(&packages, &entries)?;

    Ok(Index {
        content_version,
        guid,
        reserved,
        packages,
        entries,
        folders,
    })
}

fn read_package(reader: &mut BinaryReader<'_>) -> Result<Package> {
    let name = reader.read_cstring()?.into_owned();

    let level_count = reader.read_u32()? as usize;
    let mut levels = Vec::with_capacity(level_count.min(reader.remaining()));
    for _ in 0..level_count {
        levels.push(reader.read_cstring()?.into_owned());
    }

    let chunk = reader.read_u32()?;

    Ok(Package {
        name,
        levels,
        chunk,
    })
}

fn read_entry(reader: &mut BinaryReader<'_>, index: usize) -> Result<Entry> {
    let flags = reader.read_u16()?;

    let kind = if flags & FLAG_FILE != 0 {
        EntryKind::File {
            package: reader.read_u16()?,
            offset: reader.read_u32()?,
            size_uncompressed: reader.read_u32()?,
            size_compressed: reader.read_u32()?,
        }
    } else {
        EntryKind::Folder {
            num_files: reader.read_u16()?,
            first_file: reader.read_u32()?,
        }
    };

    let name = read_xor_string(reader)?;

    Ok(Entry {
        index,
        flags,
        name,
        kind,
    })
}

/// Check the tree invariants queries rely on.
///
/// Non-empty folder ranges must start after the folder itself, so every
/// descent moves strictly forward through the table. Every entry but the
/// root is held by exactly one folder range, which gives each entry a single
/// ancestor chain and bounds a full walk by the table size.
fn validate(packages: &[Package], entries: &[Entry]) -> Result<()> {
    let invalid = |index: usize, reason: String| Error::InvalidEntry { index, reason };

    match entries.first() {
        None => return Err(invalid(0, "index has no root folder".into())),
        Some(root) if root.is_file() => return Err(invalid(0, "root entry is a file".into())),
        Some(_) => {}
    }

    let mut owners: Vec<Option<usize>> = vec![None; entries.len()];

    for entry in entries {
        match entry.kind {
            EntryKind::File { package, .. } => {
                if package as usize >= packages.len() {
                    return Err(invalid(
                        entry.index,
                        format!(
                            "package {} out of range ({} packages)",
                            package,
                            packages.len()
                        ),
                    ));
                }
            }
            EntryKind::Folder { num_files, .. } => {
                let range = entry.children();
                if range.end > entries.len() {
                    return Err(invalid(
                        entry.index,
                        format!(
                            "range {}..{} exceeds {} entries",
                            range.start,
                            range.end,
                            entries.len()
                        ),
                    ));
                }
                if num_files > 0 && range.start <= entry.index {
                    return Err(invalid(
                        entry.index,
                        format!("range starts at {} before its folder", range.start),
                    ));
                }
                for child in range {
                    if let Some(owner) = owners[child] {
                        return Err(invalid(
                            child,
                            format!("held by folders {} and {}", owner, entry.index),
                        ));
                    }
                    owners[child] = Some(entry.index);
                }
            }
        }
    }

    if let Some(orphan) = owners.iter().skip(1).position(Option::is_none) {
        return Err(invalid(orphan + 1, "not held by any folder".into()));
    }

    Ok(())
}
