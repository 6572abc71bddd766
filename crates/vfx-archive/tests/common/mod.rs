//! Synthetic VFX indices and packages for integration tests.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use tempfile::TempDir;
use vfx_archive::{Entry, EntryKind, Package, COMPRESSION_LZ4, FLAG_FILE, VFX_VERSION};

/// Serialises an index in the on-disk layout.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    pub version: u32,
    pub compression: u32,
    pub content_version: String,
    pub guid: [u8; 16],
    pub reserved: u32,
    pub packages: Vec<Package>,
    pub entries: Vec<Entry>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            version: VFX_VERSION,
            compression: COMPRESSION_LZ4,
            content_version: "1.0.0.17".into(),
            guid: [
                0x78, 0x56, 0x34, 0x12, 0xcd, 0xab, 0x01, 0xef, 0x45, 0x23, 0x67, 0x89, 0xab,
                0xcd, 0xef, 0x01,
            ],
            reserved: 0,
            packages: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn package(&mut self, name: &str, levels: &[&str], chunk: u32) -> u16 {
        self.packages.push(Package {
            name: name.into(),
            levels: levels.iter().map(|l| l.to_string()).collect(),
            chunk,
        });
        (self.packages.len() - 1) as u16
    }

    pub fn folder(&mut self, name: &str, first_file: u32, num_files: u16) -> usize {
        self.push(
            name,
            0,
            EntryKind::Folder {
                num_files,
                first_file,
            },
        )
    }

    pub fn file(&mut self, name: &str, package: u16, offset: u32, size: u32, compressed: u32) -> usize {
        self.push(
            name,
            FLAG_FILE,
            EntryKind::File {
                package,
                offset,
                size_uncompressed: size,
                size_compressed: compressed,
            },
        )
    }

    fn push(&mut self, name: &str, flags: u16, kind: EntryKind) -> usize {
        let index = self.entries.len();
        self.entries.push(Entry {
            index,
            flags,
            name: name.into(),
            kind,
        });
        index
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(self.version).unwrap();
        out.write_u32::<LittleEndian>(self.compression).unwrap();
        write_cstring(&mut out, &self.content_version);
        out.write_all(&self.guid).unwrap();
        out.write_u32::<LittleEndian>(self.packages.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(self.entries.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(self.reserved).unwrap();

        for package in &self.packages {
            write_cstring(&mut out, &package.name);
            out.write_u32::<LittleEndian>(package.levels.len() as u32).unwrap();
            for level in &package.levels {
                write_cstring(&mut out, level);
            }
            out.write_u32::<LittleEndian>(package.chunk).unwrap();
        }

        for entry in &self.entries {
            out.write_u16::<LittleEndian>(entry.flags).unwrap();
            match entry.kind {
                EntryKind::File {
                    package,
                    offset,
                    size_uncompressed,
                    size_compressed,
                } => {
                    out.write_u16::<LittleEndian>(package).unwrap();
                    out.write_u32::<LittleEndian>(offset).unwrap();
                    out.write_u32::<LittleEndian>(size_uncompressed).unwrap();
                    out.write_u32::<LittleEndian>(size_compressed).unwrap();
                }
                EntryKind::Folder {
                    num_files,
                    first_file,
                } => {
                    out.write_u16::<LittleEndian>(num_files).unwrap();
                    out.write_u32::<LittleEndian>(first_file).unwrap();
                }
            }
            let mask = (entry.index as u8).wrapping_mul(37).wrapping_add(11);
            write_xor_string(&mut out, &entry.name, mask);
        }

        out
    }

    /// Write the index into `dir` and return its path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

pub fn write_cstring(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

pub fn write_xor_string(out: &mut Vec<u8>, s: &str, mask: u8) {
    out.write_u8((s.len() + 1) as u8).unwrap();
    out.write_u8(mask).unwrap();
    out.extend(s.bytes().map(|b| b ^ mask));
    out.push(0);
}

/// Deterministic, compressible test payload.
pub fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| ((i / 16) as u8).wrapping_add(seed)).collect()
}

/// Appends blobs to a package buffer, returning their offsets.
#[derive(Debug, Default)]
pub struct PackageWriter {
    pub data: Vec<u8>,
}

impl PackageWriter {
    pub fn push(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(bytes);
        offset
    }

    pub fn write_to(&self, dir: &Path, name: &str) {
        fs::write(dir.join(name), &self.data).unwrap();
    }
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}
