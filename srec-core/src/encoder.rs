//! Encoder session: binary chunks in, record lines out
//!
//! A session writes, in order:
//! 1. Optional S0 header text
//! 2. One S1/S2/S3 record per chunk, at the running address
//! 3. Exactly one S5/S6 count record
//! 4. Exactly one S7/S8/S9 termination record carrying the start address
//!
//! The CRC-32 of every data byte is accumulated along the way so that the
//! caller can embed it as an integrity header afterwards.

use crate::checksum::Crc32;
use crate::constants::{AddressSize, MAX_S6_COUNT};
use crate::error::SrecError;
use crate::header::crc_header_record;
use crate::record::{Record, RecordKind};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind, Read, Write};

#[cfg(feature = "logging")]
use tracing::debug;

/// Lifecycle of an encoding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Accepting header and data records
    Open,
    /// Count and termination records written; no further writes
    Finished,
    /// Finished, with the CRC-32 header spliced in front of the file
    HeaderEmbedded,
}

/// Options for one encoding run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Address width used for every record in the file
    pub address_size: AddressSize,

    /// Address of the first data byte
    pub base_address: u32,

    /// Start address for the termination record; defaults to `base_address`
    pub exec_address: Option<u32>,

    /// Prepend an S0 record carrying the CRC-32 of the input
    pub embed_crc: bool,

    /// Text for an S0 header record written before the data
    pub header: Option<String>,
}

impl EncodeOptions {
    /// Default options for the given address width
    pub fn new(address_size: AddressSize) -> Self {
        Self {
            address_size,
            ..Self::default()
        }
    }

    /// Set the base address
    pub fn base_address(mut self, address: u32) -> Self {
        self.base_address = address;
        self
    }

    /// Set the execution start address
    pub fn exec_address(mut self, address: u32) -> Self {
        self.exec_address = Some(address);
        self
    }

    /// Enable the CRC-32 header
    pub fn with_crc(mut self) -> Self {
        self.embed_crc = true;
        self
    }

    /// Add an S0 header text record
    pub fn header(mut self, text: impl Into<String>) -> Self {
        self.header = Some(text.into());
        self
    }

    /// Execution start address after defaulting
    pub fn effective_exec_address(&self) -> u32 {
        self.exec_address.unwrap_or(self.base_address)
    }

    /// Check that both addresses fit the chosen width
    pub fn validate(&self) -> Result<(), SrecError> {
        let max = self.address_size.max_address();
        if self.base_address > max {
            return Err(SrecError::constraint("base address", self.base_address, max));
        }
        let exec = self.effective_exec_address();
        if exec > max {
            return Err(SrecError::constraint("exec address", exec, max));
        }
        Ok(())
    }
}

/// Totals for a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeSummary {
    /// Address width of the file
    pub address_size: AddressSize,
    /// Number of S1/S2/S3 records written
    pub record_count: u32,
    /// Number of data bytes written
    pub data_bytes: u64,
    /// CRC-32 over all data bytes
    pub crc: u32,
    /// Kind of the count record (S5 or S6)
    pub count_kind: RecordKind,
    /// Address following the last data byte, wrapped to the address width
    pub end_address: u32,
    /// Start address carried by the termination record
    pub exec_address: u32,
}

/// Stateful record writer over any `Write` sink
pub struct Encoder<W: Write> {
    sink: W,
    address_size: AddressSize,
    address: u32,
    exec_address: u32,
    record_count: u32,
    crc: Crc32,
    state: SessionState,
}

impl<W: Write> Encoder<W> {
    /// Begin a session at `base_address`; the start address equals the base
    pub fn open(sink: W, address_size: AddressSize, base_address: u32) -> Result<Self, SrecError> {
        Self::with_options(sink, &EncodeOptions::new(address_size).base_address(base_address))
    }

    /// Begin a session from options, writing the header text record if one is set
    pub fn with_options(sink: W, options: &EncodeOptions) -> Result<Self, SrecError> {
        options.validate()?;

        #[cfg(feature = "logging")]
        debug!(
            "Opening {}-bit session at {:#X}",
            options.address_size.bits(),
            options.base_address
        );

        let mut encoder = Self {
            sink,
            address_size: options.address_size,
            address: options.base_address,
            exec_address: options.effective_exec_address(),
            record_count: 0,
            crc: Crc32::new(),
            state: SessionState::Open,
        };

        if let Some(text) = &options.header {
            encoder.write_header(text.as_bytes())?;
        }

        Ok(encoder)
    }

    /// Write an S0 header record; only allowed before the first data record
    pub fn write_header(&mut self, payload: &[u8]) -> Result<(), SrecError> {
        self.ensure_open()?;
        if self.record_count > 0 {
            return Err(SrecError::constraint(
                "header after data records",
                self.record_count,
                0u32,
            ));
        }

        let record = Record::header(Bytes::copy_from_slice(payload))?;
        self.write_record(&record)
    }

    /// Write one data record at the running address
    ///
    /// The chunk must not exceed [`AddressSize::max_payload`]; the session
    /// does not split it.
    pub fn write_data(&mut self, chunk: &[u8]) -> Result<(), SrecError> {
        self.ensure_open()?;

        let max = self.address_size.max_payload();
        if chunk.len() > max {
            return Err(SrecError::constraint(
                "payload length",
                chunk.len() as u64,
                max as u64,
            ));
        }

        let record = Record::data(
            self.address_size,
            self.address,
            Bytes::copy_from_slice(chunk),
        )?;
        self.write_record(&record)?;

        self.crc.update(chunk);
        self.record_count += 1;
        self.address = wrap_address(self.address, chunk.len(), self.address_size);

        Ok(())
    }

    /// Write the count and termination records and close the session
    pub fn finish(&mut self) -> Result<EncodeSummary, SrecError> {
        self.ensure_open()?;

        if self.record_count > MAX_S6_COUNT {
            return Err(SrecError::OutOfRange(self.record_count));
        }

        let count = Record::count(self.record_count)?;
        self.write_record(&count)?;

        let termination = Record::termination(self.address_size, self.exec_address)?;
        self.write_record(&termination)?;

        self.sink.flush()?;
        self.state = SessionState::Finished;

        #[cfg(feature = "logging")]
        debug!(
            "Session finished: {} data records, {} bytes, crc {:08X}",
            self.record_count,
            self.crc.len(),
            self.crc.value()
        );

        Ok(self.summary(count.kind()))
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Address the next data record will be written at
    pub fn address(&self) -> u32 {
        self.address
    }

    /// Data records written so far
    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    /// Address width of the session
    pub fn address_size(&self) -> AddressSize {
        self.address_size
    }

    /// CRC-32 of the data written so far
    pub fn crc(&self) -> u32 {
        self.crc.value()
    }

    /// Get back the sink
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn ensure_open(&self) -> Result<(), SrecError> {
        match self.state {
            SessionState::Open => Ok(()),
            _ => Err(SrecError::SessionClosed),
        }
    }

    fn write_record(&mut self, record: &Record) -> Result<(), SrecError> {
        writeln!(self.sink, "{}", record)?;
        Ok(())
    }

    fn summary(&self, count_kind: RecordKind) -> EncodeSummary {
        EncodeSummary {
            address_size: self.address_size,
            record_count: self.record_count,
            data_bytes: self.crc.len(),
            crc: self.crc.value(),
            count_kind,
            end_address: self.address,
            exec_address: self.exec_address,
        }
    }
}

fn wrap_address(address: u32, len: usize, address_size: AddressSize) -> u32 {
    let next = u64::from(address) + len as u64;
    (next & u64::from(address_size.max_address())) as u32
}

/// Feed `reader` through the session in chunks of `max_payload` bytes
///
/// Short reads are retried until the chunk is full or the input ends, so every
/// record but the last carries a full payload. No empty record is written at
/// end of input. Returns the number of bytes consumed.
pub fn encode_stream<R: Read, W: Write>(
    mut reader: R,
    encoder: &mut Encoder<W>,
) -> Result<u64, SrecError> {
    let mut buf = vec![0u8; encoder.address_size().max_payload()];
    let mut total = 0u64;

    loop {
        let n = fill_chunk(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }

        encoder.write_data(&buf[..n])?;
        total += n as u64;

        if n < buf.len() {
            break;
        }
    }

    Ok(total)
}

fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Encode everything from `reader` into `sink` and finish the session
///
/// `embed_crc` is ignored here: a plain sink cannot be rewritten in place.
/// Use [`encode_to_string`] or [`crate::file::encode_to_file`] for that.
pub fn encode<R: Read, W: Write>(
    reader: R,
    sink: W,
    options: &EncodeOptions,
) -> Result<EncodeSummary, SrecError> {
    let mut encoder = Encoder::with_options(sink, options)?;
    encode_stream(reader, &mut encoder)?;
    encoder.finish()
}

/// Encode a byte slice into S-record text, prepending the CRC-32 header if requested
pub fn encode_to_string(data: &[u8], options: &EncodeOptions) -> Result<String, SrecError> {
    let mut body = Vec::new();
    let summary = encode(data, &mut body, options)?;

    let mut text = String::with_capacity(body.len() + 24);
    if options.embed_crc {
        text.push_str(&crc_header_record(summary.crc)?.serialize());
        text.push('\n');
    }
    text.push_str(
        core::str::from_utf8(&body)
            .map_err(|e| SrecError::InvalidRecord(e.to_string()))?,
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(out: &[u8]) -> Vec<String> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_single_chunk_session() {
        let mut out = Vec::new();
        let mut encoder = Encoder::open(&mut out, AddressSize::Bits32, 0).unwrap();
        encoder
            .write_data(&[0x7F, 0x45, 0x4C, 0x46, 0x01, 0x01, 0x01, 0x03])
            .unwrap();
        assert_eq!(encoder.address(), 8);
        assert_eq!(encoder.record_count(), 1);

        let summary = encoder.finish().unwrap();
        assert_eq!(summary.record_count, 1);
        assert_eq!(summary.count_kind, RecordKind::S5);

        assert_eq!(
            lines(&out),
            vec![
                "S30D000000007F454C460101010396",
                "S5030001FB",
                "S70500000000FA",
            ]
        );
    }

    #[test]
    fn test_empty_session_still_terminates() {
        let mut out = Vec::new();
        let mut encoder = Encoder::open(&mut out, AddressSize::Bits16, 0).unwrap();
        let summary = encoder.finish().unwrap();

        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.crc, 0);
        assert_eq!(lines(&out), vec!["S5030000FC", "S9030000FC"]);
    }

    #[test]
    fn test_write_after_finish_fails() {
        let mut encoder = Encoder::open(Vec::new(), AddressSize::Bits24, 0).unwrap();
        encoder.finish().unwrap();
        assert_eq!(encoder.state(), SessionState::Finished);

        assert_eq!(encoder.write_data(b"late"), Err(SrecError::SessionClosed));
        assert_eq!(encoder.write_header(b"late"), Err(SrecError::SessionClosed));
        assert_eq!(encoder.finish(), Err(SrecError::SessionClosed));
    }

    #[test]
    fn test_oversized_chunk_rejected() {
        let mut encoder = Encoder::open(Vec::new(), AddressSize::Bits32, 0).unwrap();
        let err = encoder.write_data(&[0u8; 250]).unwrap_err();
        assert_eq!(
            err,
            SrecError::ConstraintViolation {
                field: "payload length",
                value: 250,
                max: 249,
            }
        );
        assert_eq!(encoder.record_count(), 0);
    }

    #[test]
    fn test_count_record_switches_to_s6() {
        let mut encoder = Encoder::open(io::sink(), AddressSize::Bits32, 0).unwrap();
        for _ in 0..=crate::constants::MAX_S5_COUNT {
            encoder.write_data(&[]).unwrap();
        }

        let summary = encoder.finish().unwrap();
        assert_eq!(summary.record_count, 0x1_0000);
        assert_eq!(summary.count_kind, RecordKind::S6);
    }

    #[test]
    fn test_too_many_records_is_out_of_range() {
        // Skip ahead to just below the last count an S6 record can carry
        let mut at_limit = Encoder::open(io::sink(), AddressSize::Bits16, 0).unwrap();
        at_limit.record_count = MAX_S6_COUNT - 1;
        at_limit.write_data(&[]).unwrap();
        assert_eq!(at_limit.finish().unwrap().count_kind, RecordKind::S6);

        let mut encoder = Encoder::open(io::sink(), AddressSize::Bits16, 0).unwrap();
        encoder.record_count = MAX_S6_COUNT - 1;
        encoder.write_data(&[]).unwrap();
        encoder.write_data(&[]).unwrap();
        assert_eq!(encoder.record_count(), MAX_S6_COUNT + 1);
        assert_eq!(encoder.finish(), Err(SrecError::OutOfRange(0x100_0000)));
        assert_eq!(encoder.state(), SessionState::Open);
    }

    #[test]
    fn test_base_and_exec_address() {
        let options = EncodeOptions::new(AddressSize::Bits24)
            .base_address(0x1000)
            .exec_address(0x1234);
        let mut out = Vec::new();
        let mut encoder = Encoder::with_options(&mut out, &options).unwrap();
        encoder.write_data(&[0xAA, 0xBB]).unwrap();
        encoder.write_data(&[0xCC]).unwrap();
        encoder.finish().unwrap();

        let lines = lines(&out);
        assert!(lines[0].starts_with("S206001000AABB"));
        assert!(lines[1].starts_with("S205001002CC"));
        assert!(lines[3].starts_with("S804001234"));
    }

    #[test]
    fn test_address_wraps_at_width() {
        let mut encoder = Encoder::open(Vec::new(), AddressSize::Bits16, 0xFFFE).unwrap();
        encoder.write_data(&[1, 2, 3, 4]).unwrap();
        assert_eq!(encoder.address(), 0x0002);
        encoder.write_data(&[5]).unwrap();
    }

    #[test]
    fn test_base_address_must_fit_width() {
        let err = Encoder::open(Vec::new(), AddressSize::Bits16, 0x1_0000)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SrecError::ConstraintViolation { field: "base address", .. }
        ));
    }

    #[test]
    fn test_header_text_before_data_only() {
        let options = EncodeOptions::new(AddressSize::Bits16).header("HDR");
        let mut out = Vec::new();
        let mut encoder = Encoder::with_options(&mut out, &options).unwrap();
        encoder.write_data(b"x").unwrap();
        assert!(matches!(
            encoder.write_header(b"again"),
            Err(SrecError::ConstraintViolation { .. })
        ));
        encoder.finish().unwrap();

        assert!(lines(&out)[0].starts_with("S0060000484452"));
    }

    #[test]
    fn test_encode_stream_chunks_full_payloads() {
        let data = vec![0x42u8; 249 * 2 + 10];
        let mut encoder = Encoder::open(Vec::new(), AddressSize::Bits32, 0).unwrap();
        let consumed = encode_stream(&data[..], &mut encoder).unwrap();
        assert_eq!(consumed, data.len() as u64);
        assert_eq!(encoder.record_count(), 3);
        assert_eq!(encoder.address(), data.len() as u32);
    }

    #[test]
    fn test_encode_stream_exact_multiple_has_no_empty_record() {
        let data = vec![0u8; 251 * 2];
        let mut encoder = Encoder::open(Vec::new(), AddressSize::Bits16, 0).unwrap();
        encode_stream(&data[..], &mut encoder).unwrap();
        assert_eq!(encoder.record_count(), 2);
    }

    /// Reader handing out at most 7 bytes per call
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.0.len()).min(7);
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_short_reads_still_fill_records() {
        let data: Vec<u8> = (0..600u32).map(|i| i as u8).collect();
        let mut encoder = Encoder::open(Vec::new(), AddressSize::Bits24, 0).unwrap();
        encode_stream(Trickle(&data), &mut encoder).unwrap();
        assert_eq!(encoder.record_count(), 3);
    }

    #[test]
    fn test_encode_to_string_with_crc_header() {
        let options = EncodeOptions::new(AddressSize::Bits32).with_crc();
        let text = encode_to_string(b"123456789", &options).unwrap();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("S008000089A1897F00"));
    }
}
