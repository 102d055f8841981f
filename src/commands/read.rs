//! Read command implementation

use indicatif::{ProgressBar, ProgressStyle};
use spiflash_fs_core::bus::SpiBus;
use spiflash_fs_core::flash::{FlashHal, SpiFlashDevice};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::{resolve_range, CHUNK_SIZE};

/// Run the read command
pub fn run_read<B: SpiBus>(
    dev: &mut SpiFlashDevice<B>,
    output: &Path,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (start, length) = resolve_range(dev.config(), start, length)?;

    let data = read_with_progress(dev, start, length as usize)?;

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!(
        "Read {} bytes from 0x{:08X} to {:?}",
        data.len(),
        start,
        output
    );
    Ok(())
}

/// Read a range with a progress bar
pub fn read_with_progress<B: SpiBus>(
    dev: &mut SpiFlashDevice<B>,
    start: u32,
    len: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = vec![0u8; len];

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    let mut offset = 0usize;
    for chunk in data.chunks_mut(CHUNK_SIZE) {
        dev.read(start + offset as u32, chunk)?;
        offset += chunk.len();
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Read complete");
    Ok(data)
}
