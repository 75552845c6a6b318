//! Record model: the nine S-record kinds and their text form
//!
//! A record line is laid out as:
//! 1. `S` and the type digit
//! 2. Byte count (2 hex digits): address/count bytes + payload bytes + checksum byte
//! 3. Address or count (4, 6 or 8 hex digits, big-endian)
//! 4. Payload (2 hex digits per byte, data and header records only)
//! 5. Checksum (2 hex digits): one's complement of the low byte of the sum of
//!    the byte count, address/count and payload bytes

use crate::constants::{AddressSize, CHECKSUM_SIZE, MAX_BYTE_COUNT, RECORD_START};
use crate::error::SrecError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// S-record kinds of the 16/24/32-bit family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Header
    S0,
    /// Data, 16-bit address
    S1,
    /// Data, 24-bit address
    S2,
    /// Data, 32-bit address
    S3,
    /// 16-bit data record count
    S5,
    /// 24-bit data record count
    S6,
    /// Termination, 32-bit start address
    S7,
    /// Termination, 24-bit start address
    S8,
    /// Termination, 16-bit start address
    S9,
}

impl RecordKind {
    /// All kinds in type-digit order
    pub const ALL: [RecordKind; 9] = [
        RecordKind::S0,
        RecordKind::S1,
        RecordKind::S2,
        RecordKind::S3,
        RecordKind::S5,
        RecordKind::S6,
        RecordKind::S7,
        RecordKind::S8,
        RecordKind::S9,
    ];

    /// Type digit written after the leading `S`
    pub const fn type_digit(&self) -> char {
        match self {
            RecordKind::S0 => '0',
            RecordKind::S1 => '1',
            RecordKind::S2 => '2',
            RecordKind::S3 => '3',
            RecordKind::S5 => '5',
            RecordKind::S6 => '6',
            RecordKind::S7 => '7',
            RecordKind::S8 => '8',
            RecordKind::S9 => '9',
        }
    }

    /// Look up a kind by its type digit
    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            b'0' => Some(RecordKind::S0),
            b'1' => Some(RecordKind::S1),
            b'2' => Some(RecordKind::S2),
            b'3' => Some(RecordKind::S3),
            b'5' => Some(RecordKind::S5),
            b'6' => Some(RecordKind::S6),
            b'7' => Some(RecordKind::S7),
            b'8' => Some(RecordKind::S8),
            b'9' => Some(RecordKind::S9),
            _ => None,
        }
    }

    /// Width in bytes of the address (or count) field
    pub const fn field_width(&self) -> usize {
        match self {
            RecordKind::S0 | RecordKind::S1 | RecordKind::S5 | RecordKind::S9 => 2,
            RecordKind::S2 | RecordKind::S6 | RecordKind::S8 => 3,
            RecordKind::S3 | RecordKind::S7 => 4,
        }
    }

    /// Largest value the address (or count) field can hold
    pub const fn max_field_value(&self) -> u32 {
        match self.field_width() {
            2 => 0xFFFF,
            3 => 0xFF_FFFF,
            _ => 0xFFFF_FFFF,
        }
    }

    /// S1, S2 or S3
    pub const fn is_data(&self) -> bool {
        matches!(self, RecordKind::S1 | RecordKind::S2 | RecordKind::S3)
    }

    /// S5 or S6
    pub const fn is_count(&self) -> bool {
        matches!(self, RecordKind::S5 | RecordKind::S6)
    }

    /// S7, S8 or S9
    pub const fn is_termination(&self) -> bool {
        matches!(self, RecordKind::S7 | RecordKind::S8 | RecordKind::S9)
    }

    /// Whether records of this kind carry a payload
    pub const fn has_payload(&self) -> bool {
        matches!(self, RecordKind::S0) || self.is_data()
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.type_digit())
    }
}

/// A single S-record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    address: u32,
    payload: Bytes,
}

impl Record {
    /// Build a record, checking that every field fits its width
    ///
    /// `address_or_count` is the address for S0-S3 and S7-S9 records and the
    /// data record count for S5/S6.
    pub fn build(
        kind: RecordKind,
        address_or_count: u32,
        payload: Bytes,
    ) -> Result<Self, SrecError> {
        let max_field = kind.max_field_value();
        if address_or_count > max_field {
            let field = if kind.is_count() { "count" } else { "address" };
            return Err(SrecError::constraint(field, address_or_count, max_field));
        }

        if !kind.has_payload() && !payload.is_empty() {
            return Err(SrecError::constraint(
                "payload length",
                payload.len() as u64,
                0u64,
            ));
        }

        let byte_count = kind.field_width() + payload.len() + CHECKSUM_SIZE;
        if byte_count > MAX_BYTE_COUNT {
            return Err(SrecError::constraint(
                "byte count",
                byte_count as u64,
                MAX_BYTE_COUNT as u64,
            ));
        }

        Ok(Self {
            kind,
            address: address_or_count,
            payload,
        })
    }

    /// S0 header record at address 0
    pub fn header(payload: impl Into<Bytes>) -> Result<Self, SrecError> {
        Self::build(RecordKind::S0, 0, payload.into())
    }

    /// Data record for the given address width
    pub fn data(
        address_size: AddressSize,
        address: u32,
        payload: impl Into<Bytes>,
    ) -> Result<Self, SrecError> {
        Self::build(address_size.data_kind(), address, payload.into())
    }

    /// Count record: S5 up to 0xFFFF data records, S6 above
    pub fn count(record_count: u32) -> Result<Self, SrecError> {
        let kind = if record_count <= crate::constants::MAX_S5_COUNT {
            RecordKind::S5
        } else {
            RecordKind::S6
        };
        Self::build(kind, record_count, Bytes::new())
    }

    /// Termination record carrying the execution start address
    pub fn termination(address_size: AddressSize, exec_address: u32) -> Result<Self, SrecError> {
        Self::build(address_size.termination_kind(), exec_address, Bytes::new())
    }

    /// Record kind
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Address, or data record count for S5/S6
    pub fn address(&self) -> u32 {
        self.address
    }

    /// Payload bytes (empty for count and termination records)
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Value of the byte-count field
    pub fn byte_count(&self) -> u8 {
        // bounded by build()
        (self.kind.field_width() + self.payload.len() + CHECKSUM_SIZE) as u8
    }

    /// Big-endian address/count bytes followed by the payload
    pub fn record_data(&self) -> Vec<u8> {
        let width = self.kind.field_width();
        let mut data = Vec::with_capacity(width + self.payload.len());
        data.extend_from_slice(&self.address.to_be_bytes()[4 - width..]);
        data.extend_from_slice(&self.payload);
        data
    }

    /// Record checksum
    pub fn checksum(&self) -> u8 {
        record_checksum(&self.record_data())
    }

    /// Text form of the record, without a line terminator
    pub fn serialize(&self) -> String {
        let data = self.record_data();
        let mut line = String::with_capacity(4 + 2 * data.len() + 2);
        line.push(RECORD_START as char);
        line.push(self.kind.type_digit());
        line.push_str(&format!("{:02X}", data.len() + CHECKSUM_SIZE));
        line.push_str(&hex::encode_upper(&data));
        line.push_str(&format!("{:02X}", record_checksum(&data)));
        line
    }

    /// Parse one line strictly, validating framing, byte count and checksum
    pub fn parse(line: &str) -> Result<Self, SrecError> {
        let line = line.trim_end();
        let raw = line.as_bytes();

        if raw.len() < 4 || raw[0] != RECORD_START {
            return Err(SrecError::InvalidRecord(format!(
                "not an S-record: {:?}",
                truncate(line)
            )));
        }

        let kind = RecordKind::from_digit(raw[1]).ok_or_else(|| {
            SrecError::InvalidRecord(format!("unsupported record type S{}", raw[1] as char))
        })?;

        let bytes = hex::decode(&raw[2..])
            .map_err(|e| SrecError::InvalidRecord(format!("bad hex in {kind} record: {e}")))?;

        let byte_count = bytes[0] as usize;
        if bytes.len() - 1 != byte_count {
            return Err(SrecError::InvalidRecord(format!(
                "byte count {:#04X} does not match {} bytes on the line",
                byte_count,
                bytes.len() - 1
            )));
        }

        let width = kind.field_width();
        if byte_count < width + CHECKSUM_SIZE {
            return Err(SrecError::InvalidRecord(format!(
                "byte count {byte_count:#04X} too small for {kind} record"
            )));
        }

        let body = &bytes[1..bytes.len() - 1];
        let expected = bytes[bytes.len() - 1];
        let actual = record_checksum(body);
        if expected != actual {
            return Err(SrecError::ChecksumMismatch { expected, actual });
        }

        let address = body[..width]
            .iter()
            .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
        let payload = Bytes::copy_from_slice(&body[width..]);

        Self::build(kind, address, payload).map_err(|e| SrecError::InvalidRecord(e.to_string()))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Checksum over address/count and payload bytes
///
/// The byte-count field (`data.len() + 1`) is included in the sum.
pub fn record_checksum(data: &[u8]) -> u8 {
    let sum = data
        .iter()
        .fold((data.len() + CHECKSUM_SIZE) as u8, |acc, b| {
            acc.wrapping_add(*b)
        });
    !sum
}

/// Uppercase hex of each byte, as used for S0 header text
///
/// Takes raw bytes, so header text outside ASCII encodes byte for byte.
pub fn ascii_to_hex(text: impl AsRef<[u8]>) -> String {
    hex::encode_upper(text.as_ref())
}

fn truncate(line: &str) -> &str {
    match line.char_indices().nth(32) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
