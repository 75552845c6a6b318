//! # SREC Core
//!
//! Encoding, decoding and integrity checking for Motorola S-record files
//! (16/24/32-bit address family: S0, S1/S2/S3, S5/S6, S7/S8/S9).
//!
//! ## Modules
//!
//! - `constants`: Format limits and the per-file address width
//! - `record`: The record model, serialization and strict parsing
//! - `checksum`: Streaming CRC-32 for the integrity header
//! - `encoder`: Encoder session and chunking driver
//! - `header`: CRC-32 header record and in-place embedding
//! - `file`: Two-phase file encoding
//! - `decoder`: Data record decoding in file order
//! - `verify`: Integrity verification against the embedded CRC-32
//! - `inspect`: Strict per-record statistics
//! - `lines`: Line splitting shared by the readers

#![warn(missing_docs)]

pub mod checksum;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod file;
pub mod header;
pub mod inspect;
pub mod lines;
pub mod record;
pub mod verify;

// Re-export commonly used types
pub use constants::{max_payload, AddressSize};
pub use encoder::{EncodeOptions, EncodeSummary, Encoder, SessionState};
pub use error::SrecError;
pub use record::{ascii_to_hex, Record, RecordKind};
pub use verify::VerifyReport;

/// Result type alias for S-record operations
pub type Result<T> = core::result::Result<T, SrecError>;
