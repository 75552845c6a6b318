//! Basic encoding example

use srec_core::{
    decoder::decode_bytes, encoder::encode_to_string, verify::verify_bytes, AddressSize,
    EncodeOptions,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("S-record Basic Encoding Example\n");

    let firmware: Vec<u8> = (0..600u32).map(|i| (i % 251) as u8).collect();

    let options = EncodeOptions::new(AddressSize::Bits24)
        .header("demo")
        .base_address(0x1000)
        .with_crc();
    let text = encode_to_string(&firmware, &options)?;

    for line in text.lines() {
        let preview = if line.len() > 40 { &line[..40] } else { line };
        println!("{preview}{}", if line.len() > 40 { "..." } else { "" });
    }

    let report = verify_bytes(text.as_bytes());
    println!(
        "\nStored CRC {:08X}, computed {:08X}, match: {}",
        report.stored_crc, report.computed_crc, report.matched
    );

    let decoded = decode_bytes(text.as_bytes());
    assert_eq!(decoded.as_ref(), &firmware[..]);

    std::fs::write("example_output.srec", &text)?;

    println!("\nWrote {} bytes to example_output.srec", text.len());
    println!("Use 'srec verify --input example_output.srec' to check it");

    Ok(())
}
