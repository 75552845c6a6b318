//! Error types for S-record operations

/// Errors that can occur while building, writing or parsing S-records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SrecError {
    /// A value does not fit the field it is written to
    #[error("{field} {value:#X} exceeds maximum {max:#X}")]
    ConstraintViolation {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: u64,
        /// The largest value the field can hold.
        max: u64,
    },

    /// Data record count does not fit an S6 count record
    #[error("Record count {0} exceeds maximum 0xFFFFFF")]
    OutOfRange(u32),

    /// IO error during read/write/rename
    #[error("IO error: {0}")]
    Io(String),

    /// Write attempted on a finished encoder session
    #[error("Encoder session is closed")]
    SessionClosed,

    /// Address width other than 16, 24 or 32 bits
    #[error("Invalid address size: {0} bits (expected 16, 24 or 32)")]
    InvalidAddressSize(u32),

    /// Line is not a well-formed S-record
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Per-record checksum mismatch
    #[error("Checksum mismatch: expected {expected:02X}, got {actual:02X}")]
    ChecksumMismatch {
        /// The checksum stored in the record.
        expected: u8,
        /// The checksum calculated from the record contents.
        actual: u8,
    },
}

impl From<std::io::Error> for SrecError {
    fn from(err: std::io::Error) -> Self {
        SrecError::Io(err.to_string())
    }
}

impl SrecError {
    pub(crate) fn constraint(field: &'static str, value: impl Into<u64>, max: impl Into<u64>) -> Self {
        SrecError::ConstraintViolation {
            field,
            value: value.into(),
            max: max.into(),
        }
    }
}
