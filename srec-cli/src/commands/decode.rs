use anyhow::{Context, Result};
use colored::*;
use srec_core::decoder::{decode_reader, DecodeStats};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use tracing::info;

pub fn execute(input: &str, output: &str) -> Result<DecodeStats> {
    info!("Decoding {} -> {}", input, output);

    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(input)
            .with_context(|| format!("Failed to open input file: {}", input))?;
        Box::new(BufReader::new(file))
    };

    let out = File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output))?;
    let mut writer = BufWriter::new(out);

    let stats = decode_reader(reader, &mut writer)
        .with_context(|| format!("Failed to decode: {}", input))?;

    writer
        .flush()
        .with_context(|| format!("Failed to write output file: {}", output))?;

    println!("\n=== Decode Results ===");
    println!("Lines read:        {}", stats.lines);
    println!("Data records:      {}", stats.data_records);
    println!("Skipped lines:     {}", stats.skipped_lines);
    println!("Bytes written:     {}", stats.bytes_written);

    if stats.data_records == 0 {
        println!("{} No data records found", "!".yellow());
    } else {
        println!("{} Wrote {}", "✓".green(), output);
    }

    Ok(stats)
}
