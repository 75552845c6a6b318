//! Constants and limits for the S-record format

use crate::error::SrecError;
use crate::record::RecordKind;
use serde::{Deserialize, Serialize};

/// First character of every record line
pub const RECORD_START: u8 = b'S';

/// Largest value the byte-count field can hold
pub const MAX_BYTE_COUNT: usize = 255;

/// Size of the per-record checksum in bytes
pub const CHECKSUM_SIZE: usize = 1;

/// Hex digits taken by `S`, the type digit and the byte count
pub const LINE_PREFIX_LEN: usize = 4;

/// Largest data record count an S5 record can carry
pub const MAX_S5_COUNT: u32 = 0xFFFF;

/// Largest data record count an S6 record can carry
pub const MAX_S6_COUNT: u32 = 0xFF_FFFF;

/// Offset of the embedded CRC-32 within an S0 line ("S0" + count + zero address)
pub const CRC_HEADER_OFFSET: usize = LINE_PREFIX_LEN + 4;

/// Hex digits of the embedded CRC-32
pub const CRC_HEADER_DIGITS: usize = 8;

/// Smallest S0 byte count whose payload holds a whole CRC-32
pub const MIN_CRC_HEADER_BYTE_COUNT: u8 = 2 + 4 + CHECKSUM_SIZE as u8;

/// Address width of an S-record file, fixed once per file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AddressSize {
    /// 16-bit addresses (S1 data, S9 termination)
    Bits16,
    /// 24-bit addresses (S2 data, S8 termination)
    Bits24,
    /// 32-bit addresses (S3 data, S7 termination)
    #[default]
    Bits32,
}

impl AddressSize {
    /// Address field width in bytes
    pub const fn width(&self) -> usize {
        match self {
            AddressSize::Bits16 => 2,
            AddressSize::Bits24 => 3,
            AddressSize::Bits32 => 4,
        }
    }

    /// Address width in bits
    pub const fn bits(&self) -> u32 {
        (self.width() * 8) as u32
    }

    /// Largest address representable in this width
    pub const fn max_address(&self) -> u32 {
        match self {
            AddressSize::Bits16 => 0xFFFF,
            AddressSize::Bits24 => 0xFF_FFFF,
            AddressSize::Bits32 => 0xFFFF_FFFF,
        }
    }

    /// Largest data payload written per record by the encoder
    ///
    /// `255 - 1 - width - 1`: 251, 250 and 249 bytes for 16, 24 and 32 bits.
    pub const fn max_payload(&self) -> usize {
        MAX_BYTE_COUNT - 1 - self.width() - CHECKSUM_SIZE
    }

    /// Data record kind for this width
    pub const fn data_kind(&self) -> RecordKind {
        match self {
            AddressSize::Bits16 => RecordKind::S1,
            AddressSize::Bits24 => RecordKind::S2,
            AddressSize::Bits32 => RecordKind::S3,
        }
    }

    /// Termination record kind for this width
    pub const fn termination_kind(&self) -> RecordKind {
        match self {
            AddressSize::Bits16 => RecordKind::S9,
            AddressSize::Bits24 => RecordKind::S8,
            AddressSize::Bits32 => RecordKind::S7,
        }
    }
}

impl TryFrom<u32> for AddressSize {
    type Error = SrecError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            16 => Ok(AddressSize::Bits16),
            24 => Ok(AddressSize::Bits24),
            32 => Ok(AddressSize::Bits32),
            other => Err(SrecError::InvalidAddressSize(other)),
        }
    }
}

/// Largest payload the encoder writes per data record
pub const fn max_payload(address_size: AddressSize) -> usize {
    address_size.max_payload()
}
