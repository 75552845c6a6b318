use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use srec_core::{file::encode_to_file, EncodeOptions, EncodeSummary};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::info;

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{bar:40}] {bytes}/{total_bytes} ({eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

pub fn execute(input: &str, output: &str, options: &EncodeOptions) -> Result<EncodeSummary> {
    info!("Encoding {} -> {}", input, output);

    options
        .validate()
        .with_context(|| "Invalid encoding options")?;

    let encoded = if input == "-" {
        let stdin = io::stdin();
        encode_to_file(stdin.lock(), Path::new(output), options)
    } else {
        let file = File::open(input)
            .with_context(|| format!("Failed to open input file: {}", input))?;
        let len = file.metadata().map(|m| m.len()).unwrap_or(0);

        let pb = progress_bar(len);
        let result = encode_to_file(pb.wrap_read(file), Path::new(output), options);
        pb.finish_and_clear();
        result
    }
    .with_context(|| format!("Failed to encode into: {}", output))?;

    let summary = *encoded.summary();

    println!("\n=== Encoding Results ===");
    println!("Address width:     {} bits", summary.address_size.bits());
    println!("Data bytes:        {}", summary.data_bytes);
    println!("Data records:      {} x {}", summary.record_count, summary.address_size.data_kind());
    println!("Count record:      {}", summary.count_kind);
    println!("Start address:     {:#X}", summary.exec_address);
    println!("CRC-32:            {:08X}", summary.crc);

    if options.embed_crc {
        println!("{} CRC-32 header embedded in {}", "✓".green(), output);
    } else {
        println!("{} Wrote {}", "✓".green(), output);
    }

    Ok(summary)
}
