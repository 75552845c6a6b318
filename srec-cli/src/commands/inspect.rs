use anyhow::{Context, Result};
use colored::*;
use srec_core::inspect::{inspect_reader, InspectStats, MAX_REPORTED_ISSUES};
use std::fs::File;
use std::io::{self, BufReader};
use tracing::info;

fn print_stats(stats: &InspectStats) {
    println!("\n=== Inspection Results ===");
    println!("Lines:             {}", stats.lines);
    println!("Blank lines:       {}", stats.blank_lines);
    for (kind, count) in &stats.records {
        println!("{} records:        {}", kind, count);
    }
    println!("Data bytes:        {}", stats.data_bytes);

    if let (Some(min), Some(max)) = (stats.min_address, stats.max_address) {
        println!("Address range:     {:#X}..={:#X}", min, max);
    }
    if let Some(start) = stats.start_address {
        println!("Start address:     {:#X}", start);
    }

    match stats.count_matches() {
        Some(true) => println!("Count record:      {} {}", stats.data_records(), "✓".green()),
        Some(false) => println!(
            "Count record:      {} declared, {} found {}",
            stats.declared_count.unwrap_or_default(),
            stats.data_records(),
            "✗".red()
        ),
        None => println!("Count record:      {}", "missing".yellow()),
    }

    if stats.invalid_lines > 0 {
        println!("Invalid lines:     {}", stats.invalid_lines.to_string().red());
    } else {
        println!("Invalid lines:     {}", stats.invalid_lines);
    }
    if stats.checksum_errors > 0 {
        println!("Checksum errors:   {}", stats.checksum_errors.to_string().red());
    } else {
        println!("Checksum errors:   {}", stats.checksum_errors);
    }

    if !stats.issues.is_empty() {
        println!("\n=== Issues ===");
        for issue in &stats.issues {
            println!("Line {}: {}", issue.line, issue.message);
        }
        let total = stats.invalid_lines + stats.checksum_errors;
        if total > MAX_REPORTED_ISSUES as u64 {
            println!("... and {} more", total - MAX_REPORTED_ISSUES as u64);
        }
    }

    println!("\n=== Summary ===");
    if stats.is_clean() {
        println!("{} File is well-formed", "✓".green());
    } else if stats.mixed_data_kinds() {
        println!("{} File mixes data record kinds", "✗".red());
    } else {
        println!("{} File has malformed records", "✗".red());
    }
}

pub fn execute(input: &str, json: bool) -> Result<InspectStats> {
    info!("Inspecting file: {}", input);

    let stats = if input == "-" {
        inspect_reader(io::stdin().lock())
    } else {
        let file = File::open(input)
            .with_context(|| format!("Failed to open input file: {}", input))?;
        inspect_reader(BufReader::new(file))
    }
    .with_context(|| format!("Failed to read: {}", input))?;

    if json {
        let text = serde_json::to_string_pretty(&stats)
            .with_context(|| "Failed to serialize inspection results")?;
        println!("{}", text);
    } else {
        print_stats(&stats);
    }

    Ok(stats)
}
