//! Integrity verification against the embedded CRC-32 header
//!
//! The stored value comes from the first S0 line; the computed value is the
//! CRC-32 of every S1/S2/S3 payload in file order. A file without a header
//! reports a stored value of 0.

use crate::checksum::Crc32;
use crate::constants::RECORD_START;
use crate::decoder::data_payload;
use crate::error::SrecError;
use crate::header::read_crc_header;
use crate::lines::{for_each_line, RecordLines};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Outcome of a verification run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// CRC-32 read from the header, 0 if absent
    pub stored_crc: u32,
    /// CRC-32 recomputed from the data records
    pub computed_crc: u32,
    /// Whether the two agree
    pub matched: bool,
    /// Whether the first S0 line carried a readable CRC-32
    pub header_found: bool,
    /// S1/S2/S3 records folded into the CRC
    pub data_records: u64,
    /// Payload bytes folded into the CRC
    pub data_bytes: u64,
}

/// Incremental verifier fed one line at a time
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    seen_header: bool,
    stored: Option<u32>,
    crc: Crc32,
    data_records: u64,
}

impl Verifier {
    /// Create a verifier with no lines seen
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for the next line of the file
    pub fn feed_line(&mut self, line: &[u8]) {
        if line.len() >= 2 && line[0] == RECORD_START && line[1] == b'0' {
            if !self.seen_header {
                self.seen_header = true;
                self.stored = read_crc_header(line);

                #[cfg(feature = "logging")]
                log_header(self.stored);
            }
            return;
        }

        if let Some(payload) = data_payload(line) {
            self.crc.update(&payload);
            self.data_records += 1;
        }
    }

    /// Report for the lines seen so far
    pub fn report(&self) -> VerifyReport {
        let stored_crc = self.stored.unwrap_or(0);
        let computed_crc = self.crc.value();
        VerifyReport {
            stored_crc,
            computed_crc,
            matched: stored_crc == computed_crc,
            header_found: self.stored.is_some(),
            data_records: self.data_records,
            data_bytes: self.crc.len(),
        }
    }
}

#[cfg(feature = "logging")]
fn log_header(stored: Option<u32>) {
    match stored {
        Some(crc) => debug!("Found CRC-32 header {:08X}", crc),
        None => warn!("First S0 record does not carry a CRC-32"),
    }
}

/// Verify an iterator of lines
pub fn verify_lines<I, L>(lines: I) -> VerifyReport
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let mut verifier = Verifier::new();
    for line in lines {
        verifier.feed_line(line.as_ref());
    }
    verifier.report()
}

/// Verify an in-memory S-record file
pub fn verify_bytes(data: &[u8]) -> VerifyReport {
    verify_lines(RecordLines::new(data))
}

/// Verify the lines of `reader`
pub fn verify_reader<R: BufRead>(reader: R) -> Result<VerifyReport, SrecError> {
    let mut verifier = Verifier::new();
    for_each_line(reader, |line| -> Result<(), SrecError> {
        verifier.feed_line(line);
        Ok(())
    })?;

    let report = verifier.report();

    #[cfg(feature = "logging")]
    debug!(
        "Verified {} data records: stored {:08X}, computed {:08X}",
        report.data_records, report.stored_crc, report.computed_crc
    );

    Ok(report)
}

/// Verify the S-record file at `path`
pub fn verify_file(path: &Path) -> Result<VerifyReport, SrecError> {
    verify_reader(BufReader::new(File::open(path)?))
}
