use anyhow::{Context, Result};
use colored::*;
use srec_core::verify::{verify_reader, VerifyReport};
use std::fs::File;
use std::io::{self, BufReader};
use tracing::{info, warn};

pub fn execute(input: &str, json: bool) -> Result<VerifyReport> {
    info!("Verifying file: {}", input);

    let report = if input == "-" {
        verify_reader(io::stdin().lock())
    } else {
        let file = File::open(input)
            .with_context(|| format!("Failed to open input file: {}", input))?;
        verify_reader(BufReader::new(file))
    }
    .with_context(|| format!("Failed to read: {}", input))?;

    if !report.header_found {
        warn!("No CRC-32 header found in {}", input);
    }

    if json {
        let text = serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize verification report")?;
        println!("{}", text);
        return Ok(report);
    }

    println!("\n=== Verification Results ===");
    println!("Data records:      {}", report.data_records);
    println!("Data bytes:        {}", report.data_bytes);
    println!("Stored CRC-32:     {:08X}", report.stored_crc);
    println!("Computed CRC-32:   {:08X}", report.computed_crc);

    println!("\n=== Summary ===");
    if report.matched {
        println!("{} Checksum matches", "✓".green());
    } else {
        println!("{} Checksum mismatch", "✗".red());
    }

    Ok(report)
}
