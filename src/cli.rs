//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "spiflash-fs")]
#[command(author, version, about = "SPI flash storage driver tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Flash configuration file (TOML format)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Chip image file backing the emulated flash
    #[arg(short, long, global = true, default_value = "flash.img")]
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the flash configuration
    Info,

    /// Read flash contents to a file
    Read {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Start address (hex, e.g., 0x10000; defaults to region start)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Number of bytes to read (defaults to the rest of the region)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// Program a file into flash
    Write {
        /// Input file path
        #[arg(short = 'f', long)]
        input: PathBuf,

        /// Start address (hex, e.g., 0x10000; defaults to region start)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Erase the covered blocks before programming
        #[arg(long)]
        erase: bool,
    },

    /// Erase flash blocks
    Erase {
        /// Start address, must be erase block aligned
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Number of bytes to erase (defaults to the rest of the region)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// Print the bus transactions of a driver operation
    #[command(subcommand)]
    Trace(TraceCommands),

    /// Mount the reference filesystem on a scratch chip and exercise it
    Selftest {
        /// Number of bytes to write to the test file
        #[arg(long, default_value = "1000")]
        size: usize,
    },
}

/// Operations whose bus traffic can be traced
#[derive(Subcommand)]
pub enum TraceCommands {
    /// Trace a read
    Read {
        /// Start address
        #[arg(long, value_parser = parse_hex_u32)]
        start: u32,

        /// Number of bytes
        #[arg(long, value_parser = parse_hex_u32)]
        length: u32,
    },

    /// Trace programming some bytes
    Write {
        /// Start address
        #[arg(long, value_parser = parse_hex_u32)]
        start: u32,

        /// Data to program (text)
        data: String,
    },

    /// Trace an erase
    Erase {
        /// Start address
        #[arg(long, value_parser = parse_hex_u32)]
        start: u32,

        /// Number of bytes
        #[arg(long, value_parser = parse_hex_u32)]
        length: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x10000"), Ok(0x10000));
        assert_eq!(parse_hex_u32("0XfF"), Ok(0xFF));
        assert_eq!(parse_hex_u32("4096"), Ok(4096));
        assert!(parse_hex_u32("0xZZ").is_err());
    }

    #[test]
    fn test_cli_parses_trace() {
        let cli = Cli::try_parse_from([
            "spiflash-fs",
            "-vv",
            "trace",
            "write",
            "--start",
            "0xFE",
            "hi",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Trace(TraceCommands::Write { start: 0xFE, .. })
        ));
    }
}
