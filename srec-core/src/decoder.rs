//! Data record decoding
//!
//! Only S1/S2/S3 lines contribute output. Every other line (headers, counts,
//! terminations, blanks, garbage) is skipped without error, and per-record
//! checksums are not checked. Payloads are concatenated in the order their
//! lines appear in the file; the embedded addresses are not used to reorder,
//! deduplicate or gap-fill.

use crate::constants::{LINE_PREFIX_LEN, RECORD_START};
use crate::error::SrecError;
use crate::lines::{for_each_line, RecordLines};
use crate::record::RecordKind;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::debug;

/// Line counters from a decode run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Lines read, including blank ones
    pub lines: u64,
    /// S1/S2/S3 lines decoded
    pub data_records: u64,
    /// Lines that were not decodable data records
    pub skipped_lines: u64,
    /// Payload bytes written to the sink
    pub bytes_written: u64,
}

/// Payload bytes of a data record line, or `None` if the line is not one
///
/// The payload starts after `S`, the type digit, the byte count and the
/// address field, and ends before the 2-digit checksum.
pub fn data_payload(line: &[u8]) -> Option<Vec<u8>> {
    if line.len() < 2 || line[0] != RECORD_START {
        return None;
    }
    let kind = RecordKind::from_digit(line[1]).filter(RecordKind::is_data)?;

    let start = LINE_PREFIX_LEN + 2 * kind.field_width();
    if line.len() < start + 2 {
        return None;
    }

    hex::decode(&line[start..line.len() - 2]).ok()
}

/// Decode data records from an iterator of lines
pub fn decode_lines<I, L>(lines: I) -> Bytes
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let mut out = BytesMut::new();
    for line in lines {
        if let Some(payload) = data_payload(line.as_ref()) {
            out.put_slice(&payload);
        }
    }
    out.freeze()
}

/// Decode data records from an in-memory S-record file
pub fn decode_bytes(data: &[u8]) -> Bytes {
    decode_lines(RecordLines::new(data))
}

/// Stream data record payloads from `reader` into `writer`
pub fn decode_reader<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
) -> Result<DecodeStats, SrecError> {
    let mut stats = DecodeStats::default();

    for_each_line(reader, |line| -> Result<(), SrecError> {
        stats.lines += 1;
        match data_payload(line) {
            Some(payload) => {
                writer.write_all(&payload)?;
                stats.data_records += 1;
                stats.bytes_written += payload.len() as u64;
            }
            None => {
                #[cfg(feature = "logging")]
                log_skipped(stats.lines, line);
                stats.skipped_lines += 1;
            }
        }
        Ok(())
    })?;

    writer.flush()?;

    #[cfg(feature = "logging")]
    debug!(
        "Decoded {} data records ({} bytes), skipped {} lines",
        stats.data_records, stats.bytes_written, stats.skipped_lines
    );

    Ok(stats)
}

/// Decode the S-record file at `input` into the binary file at `output`
pub fn decode_file(input: &Path, output: &Path) -> Result<DecodeStats, SrecError> {
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);
    decode_reader(reader, writer)
}

/// Blank lines and well-known non-data records are skipped quietly
#[cfg(feature = "logging")]
fn log_skipped(line_no: u64, line: &[u8]) {
    let known_kind = line.first() == Some(&RECORD_START)
        && line
            .get(1)
            .and_then(|d| RecordKind::from_digit(*d))
            .is_some_and(|kind| !kind.is_data());
    if !line.is_empty() && !known_kind {
        debug!("Skipping line {}: not a decodable data record", line_no);
    }
}
