//! Erase command implementation

use indicatif::{ProgressBar, ProgressStyle};
use spiflash_fs_core::bus::SpiBus;
use spiflash_fs_core::flash::{FlashHal, SpiFlashDevice};

use super::resolve_range;

/// Run the erase command
pub fn run_erase<B: SpiBus>(
    dev: &mut SpiFlashDevice<B>,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (start, length) = resolve_range(dev.config(), start, length)?;
    let block = dev.config().erase_block_size;

    if start % block != 0 {
        return Err(format!(
            "Erase start 0x{:08X} is not aligned to the 0x{:X} byte erase block",
            start, block
        )
        .into());
    }
    if length % block != 0 {
        log::warn!(
            "Erase length 0x{:X} is not a multiple of the erase block, the last 0x{:X} bytes are kept",
            length,
            length % block
        );
    }

    erase_with_progress(dev, start, length)?;
    println!(
        "Erased {} bytes starting at 0x{:08X}",
        length - length % block,
        start
    );
    Ok(())
}

/// Erase a block-aligned range one block at a time with a progress bar
pub fn erase_with_progress<B: SpiBus>(
    dev: &mut SpiFlashDevice<B>,
    start: u32,
    length: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let block = dev.config().erase_block_size;
    let blocks = length / block;

    let pb = ProgressBar::new(blocks as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} blocks")?
            .progress_chars("#>-"),
    );

    for i in 0..blocks {
        dev.erase(start + i * block, block)?;
        pb.inc(1);
    }

    pb.finish_with_message("Erase complete");
    Ok(())
}
