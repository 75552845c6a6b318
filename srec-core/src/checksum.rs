//! Streaming CRC-32 used for the optional integrity header
//!
//! MSB-first CRC-32 over polynomial 0x04C11DB7 with no reflection and no
//! final xor, the `xcrc32` variant common in GNU toolchains. The register is
//! the output, so the accumulator is seeded with 0 and can be continued
//! across chunks: `crc32_update(crc32_update(0, a), b) == crc32_update(0, a ++ b)`.

use crc::{Algorithm, Crc};

/// Parameters of the header CRC-32
pub const XCRC32: Algorithm<u32> = Algorithm {
    width: 32,
    poly: 0x04C1_1DB7,
    init: 0,
    refin: false,
    refout: false,
    xorout: 0,
    check: 0x89A1_897F,
    residue: 0,
};

static ENGINE: Crc<u32> = Crc::<u32>::new(&XCRC32);

/// Fold `data` into a running CRC-32 value
pub fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    let mut digest = ENGINE.digest_with_initial(crc);
    digest.update(data);
    digest.finalize()
}

/// Running CRC-32 over a sequence of chunks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc32 {
    value: u32,
    len: u64,
}

impl Crc32 {
    /// Create a fresh accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the next chunk into the accumulator
    pub fn update(&mut self, data: &[u8]) {
        self.value = crc32_update(self.value, data);
        self.len += data.len() as u64;
    }

    /// Current CRC-32 value
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Number of bytes folded in so far
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether no bytes have been folded in
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
