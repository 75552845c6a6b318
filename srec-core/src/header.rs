//! CRC-32 integrity header
//!
//! The header is an S0 record whose payload is the big-endian CRC-32 of all
//! data bytes followed by one zero byte:
//!
//! ```text
//! S0 08 0000 89A1897F 00 C5
//! ```
//!
//! It is written after the body is complete, by splicing it in front of the
//! finished file through a temporary file in the same directory.

use crate::constants::{
    CRC_HEADER_DIGITS, CRC_HEADER_OFFSET, MIN_CRC_HEADER_BYTE_COUNT, RECORD_START,
};
use crate::error::SrecError;
use crate::record::Record;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

#[cfg(feature = "logging")]
use tracing::debug;

/// S0 record carrying `crc`
pub fn crc_header_record(crc: u32) -> Result<Record, SrecError> {
    let mut payload = Vec::with_capacity(5);
    payload.extend_from_slice(&crc.to_be_bytes());
    payload.push(0);
    Record::header(payload)
}

/// Stored CRC-32 of an S0 line, if the line carries one
///
/// The byte count must leave room for four payload bytes, so a short text
/// header is never read through into its own checksum digits.
pub fn read_crc_header(line: &[u8]) -> Option<u32> {
    if line.len() < 2 || line[0] != RECORD_START || line[1] != b'0' {
        return None;
    }
    let mut byte_count = [0u8; 1];
    hex::decode_to_slice(line.get(2..4)?, &mut byte_count).ok()?;
    if byte_count[0] < MIN_CRC_HEADER_BYTE_COUNT {
        return None;
    }
    let window = line.get(CRC_HEADER_OFFSET..CRC_HEADER_OFFSET + CRC_HEADER_DIGITS)?;
    let mut crc = [0u8; 4];
    hex::decode_to_slice(window, &mut crc).ok()?;
    Some(u32::from_be_bytes(crc))
}

/// Prepend the CRC-32 header line to the file at `path`
///
/// The header and the original bytes are written to a temporary file which
/// then replaces `path` with a rename. Any failure before the rename leaves
/// `path` untouched and removes the temporary file.
pub fn embed_header(path: &Path, crc: u32) -> Result<(), SrecError> {
    let record = crc_header_record(crc)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut original = File::open(path)?;
        let mut writer = BufWriter::new(temp.as_file_mut());
        writeln!(writer, "{}", record)?;
        io::copy(&mut original, &mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;

    let permissions = fs::metadata(path)?.permissions();
    fs::set_permissions(temp.path(), permissions)?;

    temp.persist(path).map_err(|e| SrecError::from(e.error))?;

    #[cfg(feature = "logging")]
    debug!("Embedded CRC-32 header {:08X} into {}", crc, path.display());

    Ok(())
}
