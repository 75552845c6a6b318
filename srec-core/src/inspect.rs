//! Strict per-record inspection of an S-record file
//!
//! Unlike the decoder and verifier, inspection parses every line with
//! [`Record::parse`] and reports framing and checksum problems, record kind
//! counts, and whether the count record agrees with the data records found.

use crate::error::SrecError;
use crate::lines::{for_each_line, RecordLines};
use crate::record::{Record, RecordKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::warn;

/// Problems beyond this many are counted but not listed
pub const MAX_REPORTED_ISSUES: usize = 32;

/// A line that failed strict parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIssue {
    /// 1-based line number
    pub line: u64,
    /// What was wrong with it
    pub message: String,
}

/// Statistics gathered over a whole file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectStats {
    /// Lines read, including blank ones
    pub lines: u64,
    /// Empty lines
    pub blank_lines: u64,
    /// Valid records per kind
    pub records: BTreeMap<RecordKind, u64>,
    /// Lines that are not well-formed records
    pub invalid_lines: u64,
    /// Well-formed lines whose checksum is wrong
    pub checksum_errors: u64,
    /// Payload bytes in valid data records
    pub data_bytes: u64,
    /// Lowest address covered by a data record
    pub min_address: Option<u32>,
    /// Highest address covered by a data record
    pub max_address: Option<u32>,
    /// Value of the last S5/S6 record
    pub declared_count: Option<u32>,
    /// Start address of the last S7/S8/S9 record
    pub start_address: Option<u32>,
    /// First problems found, in file order
    pub issues: Vec<LineIssue>,
}

impl InspectStats {
    /// Valid S1/S2/S3 records
    pub fn data_records(&self) -> u64 {
        self.records
            .iter()
            .filter(|(kind, _)| kind.is_data())
            .map(|(_, n)| n)
            .sum()
    }

    /// Whether the count record agrees with the data records, if there is one
    pub fn count_matches(&self) -> Option<bool> {
        self.declared_count
            .map(|declared| u64::from(declared) == self.data_records())
    }

    /// Data records of more than one kind in the same file
    pub fn mixed_data_kinds(&self) -> bool {
        self.records.keys().filter(|kind| kind.is_data()).count() > 1
    }

    /// No invalid lines, no checksum errors and a consistent count record
    pub fn is_clean(&self) -> bool {
        self.invalid_lines == 0
            && self.checksum_errors == 0
            && self.count_matches() != Some(false)
            && !self.mixed_data_kinds()
    }

    /// Account for the next line of the file
    pub fn feed_line(&mut self, line: &[u8]) {
        self.lines += 1;
        if line.is_empty() {
            self.blank_lines += 1;
            return;
        }

        let parsed = match core::str::from_utf8(line) {
            Ok(text) => Record::parse(text),
            Err(_) => Err(SrecError::InvalidRecord("line is not valid UTF-8".into())),
        };

        match parsed {
            Ok(record) => self.add_record(&record),
            Err(err) => {
                if matches!(err, SrecError::ChecksumMismatch { .. }) {
                    self.checksum_errors += 1;
                } else {
                    self.invalid_lines += 1;
                }

                #[cfg(feature = "logging")]
                warn!("Line {}: {}", self.lines, err);

                if self.issues.len() < MAX_REPORTED_ISSUES {
                    self.issues.push(LineIssue {
                        line: self.lines,
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    fn add_record(&mut self, record: &Record) {
        let kind = record.kind();
        *self.records.entry(kind).or_insert(0) += 1;

        if kind.is_data() {
            let len = record.payload().len() as u64;
            self.data_bytes += len;
            if len > 0 {
                let first = record.address();
                let last = (u64::from(first) + len - 1).min(u64::from(u32::MAX)) as u32;
                self.min_address = Some(self.min_address.map_or(first, |m| m.min(first)));
                self.max_address = Some(self.max_address.map_or(last, |m| m.max(last)));
            }
        } else if kind.is_count() {
            self.declared_count = Some(record.address());
        } else if kind.is_termination() {
            self.start_address = Some(record.address());
        }
    }
}

/// Inspect an in-memory S-record file
pub fn inspect_bytes(data: &[u8]) -> InspectStats {
    let mut stats = InspectStats::default();
    for line in RecordLines::new(data) {
        stats.feed_line(line);
    }
    stats
}

/// Inspect the lines of `reader`
pub fn inspect_reader<R: BufRead>(reader: R) -> Result<InspectStats, SrecError> {
    let mut stats = InspectStats::default();
    for_each_line(reader, |line| -> Result<(), SrecError> {
        stats.feed_line(line);
        Ok(())
    })?;
    Ok(stats)
}

/// Inspect the S-record file at `path`
pub fn inspect_file(path: &Path) -> Result<InspectStats, SrecError> {
    inspect_reader(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = "S008000089A1897F00C5\n\
                         S10C000031323334353637383916\n\
                         S5030001FB\n\
                         S9030000FC\n";

    #[test]
    fn test_clean_file() {
        let stats = inspect_bytes(CLEAN.as_bytes());

        assert_eq!(stats.lines, 4);
        assert_eq!(stats.records.get(&RecordKind::S1), Some(&1));
        assert_eq!(stats.records.get(&RecordKind::S0), Some(&1));
        assert_eq!(stats.data_records(), 1);
        assert_eq!(stats.data_bytes, 9);
        assert_eq!(stats.min_address, Some(0));
        assert_eq!(stats.max_address, Some(8));
        assert_eq!(stats.declared_count, Some(1));
        assert_eq!(stats.start_address, Some(0));
        assert_eq!(stats.count_matches(), Some(true));
        assert!(stats.is_clean());
    }

    #[test]
    fn test_checksum_error_reported() {
        let text = CLEAN.replace("383916", "383917");
        let stats = inspect_bytes(text.as_bytes());

        assert_eq!(stats.checksum_errors, 1);
        assert_eq!(stats.issues.len(), 1);
        assert_eq!(stats.issues[0].line, 2);
        assert_eq!(stats.count_matches(), Some(false));
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_invalid_and_blank_lines() {
        let stats = inspect_bytes(b"\nhello\nS9030000FC\n\xff\n");
        assert_eq!(stats.blank_lines, 1);
        assert_eq!(stats.invalid_lines, 2);
        assert_eq!(stats.count_matches(), None);
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_mixed_data_kinds_not_clean() {
        let stats = inspect_bytes(b"S1050000AABB95\nS205001002CC1C\n");
        assert_eq!(stats.invalid_lines, 0);
        assert_eq!(stats.checksum_errors, 0);
        assert_eq!(stats.records.get(&RecordKind::S1), Some(&1));
        assert_eq!(stats.records.get(&RecordKind::S2), Some(&1));
        assert!(stats.mixed_data_kinds());
        assert!(!stats.is_clean());

        let single = inspect_bytes(b"S1050000AABB95\nS1040010BB30\n");
        assert!(!single.mixed_data_kinds());
        assert!(single.is_clean());
    }
}
