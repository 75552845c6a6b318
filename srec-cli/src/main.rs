use anyhow::Result;
use clap::{Parser, Subcommand};
use srec_cli::{commands, parse_addr_bits, parse_address};
use srec_core::{AddressSize, EncodeOptions};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "srec")]
#[command(about = "srec - Motorola S-record encoder, decoder and checker", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a binary file as S-records
    Encode {
        /// Input binary file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output S-record file
        #[arg(short, long, default_value = "output.srec")]
        output: String,

        /// Address width in bits: 16, 24 or 32
        #[arg(short = 'b', long, default_value = "32", value_parser = parse_addr_bits)]
        addr_bits: AddressSize,

        /// Address of the first data byte
        #[arg(long, default_value = "0", value_parser = parse_address)]
        base_address: u32,

        /// Start address for the termination record (defaults to the base address)
        #[arg(long, value_parser = parse_address)]
        exec_address: Option<u32>,

        /// Embed a CRC-32 header record
        #[arg(short, long)]
        checksum: bool,

        /// ASCII text for an S0 header record
        #[arg(long)]
        header: Option<String>,
    },

    /// Decode data records back into a binary file
    Decode {
        /// Input S-record file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output binary file
        #[arg(short, long)]
        output: String,
    },

    /// Check the embedded CRC-32 against the data records
    Verify {
        /// Input S-record file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse every record and report statistics and errors
    Inspect {
        /// Input S-record file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Encode {
            input,
            output,
            addr_bits,
            base_address,
            exec_address,
            checksum,
            header,
        } => {
            let mut options = EncodeOptions::new(addr_bits).base_address(base_address);
            if let Some(exec) = exec_address {
                options = options.exec_address(exec);
            }
            if checksum {
                options = options.with_crc();
            }
            if let Some(text) = header {
                options = options.header(text);
            }
            commands::encode::execute(&input, &output, &options).map(|_| ())
        }

        Commands::Decode { input, output } => {
            commands::decode::execute(&input, &output).map(|_| ())
        }

        Commands::Verify { input, json } => {
            let report = commands::verify::execute(&input, json)?;
            if !report.matched {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Inspect { input, json } => {
            let stats = commands::inspect::execute(&input, json)?;
            if !stats.is_clean() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
