//! VFX archive GUID.
//!
//! The index stores a 16-byte identifier laid out like a Windows `GUID`
//! structure: a little-endian `u32`, three little-endian `u16`s and six raw
//! bytes.

use std::fmt;
use std::str::FromStr;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Error;

/// A 16-byte GUID as stored in VFX index files.
///
/// Format: `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
///
/// # Byte Layout
///
/// - bytes 0-3: `a` (`u32`, little-endian)
/// - bytes 4-5: `b` (`u16`, little-endian)
/// - bytes 6-7: `c` (`u16`, little-endian)
/// - bytes 8-9: `d` (`u16`, little-endian)
/// - bytes 10-15: `e` (raw, printed in order)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct VfxGuid {
    bytes: [u8; 16],
}

impl VfxGuid {
    /// Empty GUID (all zeros).
    pub const EMPTY: Self = Self { bytes: [0; 16] };

    /// Create a GUID from its on-disk bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Create a GUID from its structured fields.
    pub fn from_fields(a: u32, b: u16, c: u16, d: u16, e: [u8; 6]) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&a.to_le_bytes());
        bytes[4..6].copy_from_slice(&b.to_le_bytes());
        bytes[6..8].copy_from_slice(&c.to_le_bytes());
        bytes[8..10].copy_from_slice(&d.to_le_bytes());
        bytes[10..16].copy_from_slice(&e);
        Self { bytes }
    }

    /// Get the raw bytes of the GUID.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    #[inline]
    pub fn a(&self) -> u32 {
        u32::from_le_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    #[inline]
    pub fn b(&self) -> u16 {
        u16::from_le_bytes([self.bytes[4], self.bytes[5]])
    }

    #[inline]
    pub fn c(&self) -> u16 {
        u16::from_le_bytes([self.bytes[6], self.bytes[7]])
    }

    #[inline]
    pub fn d(&self) -> u16 {
        u16::from_le_bytes([self.bytes[8], self.bytes[9]])
    }

    #[inline]
    pub fn e(&self) -> [u8; 6] {
        let mut e = [0u8; 6];
        e.copy_from_slice(&self.bytes[10..16]);
        e
    }

    /// Check if the GUID is empty (all zeros).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes == [0; 16]
    }
}

impl fmt::Debug for VfxGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VfxGuid({})", self)
    }
}

impl fmt::Display for VfxGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.e();
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.a(),
            self.b(),
            self.c(),
            self.d(),
            e[0], e[1], e[2], e[3], e[4], e[5]
        )
    }
}

impl FromStr for VfxGuid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 36 || !s.is_ascii() {
            return Err(Error::InvalidGuid(format!(
                "expected 36 ASCII characters, got {:?}",
                s
            )));
        }

        let parts: Vec<&str> = s.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        if parts.len() != lengths.len() || parts.iter().zip(lengths).any(|(p, l)| p.len() != l) {
            return Err(Error::InvalidGuid("invalid hyphen positions".into()));
        }

        let hex = |part: &str| -> Result<u64, Error> {
            u64::from_str_radix(part, 16)
                .map_err(|_| Error::InvalidGuid(format!("invalid hex group {:?}", part)))
        };

        let a = hex(parts[0])? as u32;
        let b = hex(parts[1])? as u16;
        let c = hex(parts[2])? as u16;
        let d = hex(parts[3])? as u16;

        let tail = hex(parts[4])?.to_be_bytes();
        let mut e = [0u8; 6];
        e.copy_from_slice(&tail[2..8]);

        Ok(Self::from_fields(a, b, c, d, e))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for VfxGuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VfxGuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BinaryReader;

    #[test]
    fn test_empty_guid() {
        let guid = VfxGuid::EMPTY;
        assert!(guid.is_empty());
        assert_eq!(guid.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_display_uses_field_layout() {
        let bytes = [
            0x78, 0x56, 0x34, 0x12, // a
            0xcd, 0xab, // b
            0x01, 0xef, // c
            0x45, 0x23, // d
            0x67, 0x89, 0xab, 0xcd, 0xef, 0x01, // e
        ];
        let mut reader = BinaryReader::new(&bytes);
        let guid: VfxGuid = reader.read_struct().unwrap();

        assert_eq!(guid.a(), 0x12345678);
        assert_eq!(guid.d(), 0x2345);
        assert_eq!(guid.to_string(), "12345678-abcd-ef01-2345-6789abcdef01");
    }

    #[test]
    fn test_roundtrip() {
        let original = "12345678-abcd-ef01-2345-6789abcdef01";
        let guid: VfxGuid = original.parse().unwrap();
        assert_eq!(guid.to_string(), original);
        assert_eq!(guid.e(), [0x67, 0x89, 0xab, 0xcd, 0xef, 0x01]);
    }

    #[test]
    fn test_invalid_length() {
        assert!("too-short".parse::<VfxGuid>().is_err());
    }

    #[test]
    fn test_invalid_hyphens() {
        assert!("12345678_abcd-ef01-2345-6789abcdef01".parse::<VfxGuid>().is_err());
        assert!("1234567-8abcd-ef01-2345-6789abcdef01".parse::<VfxGuid>().is_err());
    }

    #[test]
    fn test_invalid_hex() {
        assert!("1234567g-abcd-ef01-2345-6789abcdef01".parse::<VfxGuid>().is_err());
    }
}
