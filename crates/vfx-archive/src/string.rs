//! XOR-obfuscated entry names.
//!
//! Entry names are stored behind a 2-byte header: the low byte is the
//! length including a terminator, the high byte is the XOR mask applied to
//! every character. The terminator itself is stored unmasked.

use vfx_common::BinaryReader;

use crate::{Error, Result};

/// Decode one obfuscated string and advance past its terminator.
pub(crate) fn read_xor_string(reader: &mut BinaryReader<'_>) -> Result<String> {
    let offset = reader.position();
    let header = reader.read_u16()?;
    let length = (header & 0xFF) as usize;
    let mask = (header >> 8) as u8;

    if length == 0 {
        return Err(Error::InvalidString { offset });
    }

    let plain: Vec<u8> = reader
        .read_bytes(length - 1)?
        .iter()
        .map(|b| b ^ mask)
        .collect();

    reader.read_u8()?; // terminator

    Ok(match String::from_utf8(plain) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
