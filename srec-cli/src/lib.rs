//! Library entry for srec-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use srec_core::AddressSize;

/// Parse an address given in decimal or `0x`-prefixed hex
pub fn parse_address(value: &str) -> Result<u32, String> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", value, e))
}

/// Parse an address width in bits (16, 24 or 32)
pub fn parse_addr_bits(value: &str) -> Result<AddressSize, String> {
    let bits: u32 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid address width '{}': {}", value, e))?;
    AddressSize::try_from(bits).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("4096"), Ok(4096));
        assert_eq!(parse_address("0x1000"), Ok(0x1000));
        assert_eq!(parse_address("0XFFFFFFFF"), Ok(u32::MAX));
        assert!(parse_address("0x").is_err());
        assert!(parse_address("0x1_0000_0000").is_err());
        assert!(parse_address("ten").is_err());
    }

    #[test]
    fn test_parse_addr_bits() {
        assert_eq!(parse_addr_bits("16"), Ok(AddressSize::Bits16));
        assert_eq!(parse_addr_bits("24"), Ok(AddressSize::Bits24));
        assert_eq!(parse_addr_bits("32"), Ok(AddressSize::Bits32));
        assert!(parse_addr_bits("8").is_err());
        assert!(parse_addr_bits("abc").is_err());
    }
}
