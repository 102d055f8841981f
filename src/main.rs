//! spiflash-fs - SPI flash storage driver tool
//!
//! Runs the SPI NOR protocol driver against an emulated chip whose contents
//! live in an image file, so flash layouts can be prepared and inspected on
//! a host, and the mount lifecycle can be exercised end to end.
//!
//! # Commands
//!
//! - `info` - show the flash configuration
//! - `read` / `write` / `erase` - raw driver access to the image
//! - `trace` - print the bus transactions of one driver operation
//! - `selftest` - mount the reference filesystem and run a file cycle

mod cli;
mod commands;
mod image;

use clap::Parser;
use cli::{Cli, Commands};
use spiflash_fs_core::config::FlashConfig;
use spiflash_fs_core::flash::SpiFlashDevice;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            commands::print_info(&cfg);
            Ok(())
        }
        Commands::Read {
            output,
            start,
            length,
        } => {
            let chip = image::load(&cli.image, &cfg)?;
            let mut dev = SpiFlashDevice::new(chip, cfg)?;
            commands::run_read(&mut dev, &output, start, length)
        }
        Commands::Write { input, start, erase } => {
            let chip = image::load(&cli.image, &cfg)?;
            let mut dev = SpiFlashDevice::new(chip, cfg)?;
            let result = commands::run_write(&mut dev, &input, start, erase);
            image::save(&cli.image, dev.bus())?;
            result
        }
        Commands::Erase { start, length } => {
            let chip = image::load(&cli.image, &cfg)?;
            let mut dev = SpiFlashDevice::new(chip, cfg)?;
            commands::run_erase(&mut dev, start, length)?;
            image::save(&cli.image, dev.bus())?;
            Ok(())
        }
        Commands::Trace(op) => {
            let mut chip = image::load(&cli.image, &cfg)?;
            let result = commands::run_trace(&mut chip, cfg, &op);
            image::save(&cli.image, &chip)?;
            result
        }
        Commands::Selftest { size } => commands::run_selftest(&cfg, size),
    }
}

/// Load the flash configuration from a file, or use the defaults
fn load_config(path: Option<&Path>) -> Result<FlashConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let cfg = FlashConfig::from_toml_file(path)?;
            log::info!("Loaded flash configuration from {:?}", path);
            Ok(cfg)
        }
        None => {
            let cfg = FlashConfig::DEFAULT;
            cfg.validate()?;
            Ok(cfg)
        }
    }
}
