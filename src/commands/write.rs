//! Write command implementation

use indicatif::{ProgressBar, ProgressStyle};
use spiflash_fs_core::bus::SpiBus;
use spiflash_fs_core::flash::{FlashHal, SpiFlashDevice};
use std::path::Path;

use super::erase::erase_with_progress;
use super::read::read_with_progress;
use super::{resolve_range, CHUNK_SIZE};

/// Run the write command
///
/// Programming can only clear bits, so without `erase` the target range
/// should already be erased. The result is always verified.
pub fn run_write<B: SpiBus>(
    dev: &mut SpiFlashDevice<B>,
    input: &Path,
    start: Option<u32>,
    erase: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    let (start, _) = resolve_range(dev.config(), start, Some(data.len() as u32))?;

    if erase {
        let block = dev.config().erase_block_size;
        let first = start - start % block;
        let end = (start + data.len() as u32).div_ceil(block) * block;
        println!("Erasing 0x{:08X}..0x{:08X}", first, end);
        erase_with_progress(dev, first, end - first)?;
    }

    write_with_progress(dev, start, &data)?;

    let readback = read_with_progress(dev, start, data.len())?;
    if let Some(pos) = readback.iter().zip(&data).position(|(a, b)| a != b) {
        return Err(format!(
            "Verification failed at 0x{:08X} (was the range erased?)",
            start + pos as u32
        )
        .into());
    }

    println!("Wrote {} bytes at 0x{:08X}", data.len(), start);
    Ok(())
}

/// Program data with a progress bar
pub fn write_with_progress<B: SpiBus>(
    dev: &mut SpiFlashDevice<B>,
    start: u32,
    data: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(data.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    let mut offset = 0usize;
    for chunk in data.chunks(CHUNK_SIZE) {
        dev.write(start + offset as u32, chunk)?;
        offset += chunk.len();
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Write complete");
    Ok(())
}
