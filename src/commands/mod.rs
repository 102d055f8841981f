//! CLI command implementations
//!
//! Every command except `selftest` drives a [`SpiFlashDevice`] over the
//! emulated chip loaded from the image file.
//!
//! [`SpiFlashDevice`]: spiflash_fs_core::flash::SpiFlashDevice

mod erase;
mod info;
mod read;
mod selftest;
mod trace;
mod write;

pub use erase::run_erase;
pub use info::print_info;
pub use read::run_read;
pub use selftest::run_selftest;
pub use trace::run_trace;
pub use write::run_write;

use spiflash_fs_core::config::FlashConfig;

/// Chunk size for reads and writes reported by progress bars (4 KiB)
const CHUNK_SIZE: usize = 4096;

/// Resolve an optional start/length pair against the configured region
fn resolve_range(
    cfg: &FlashConfig,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let start = start.unwrap_or(cfg.start_addr);
    if start < cfg.start_addr || start >= cfg.end_addr {
        return Err(format!(
            "Start address 0x{:08X} is outside the flash region 0x{:08X}..0x{:08X}",
            start, cfg.start_addr, cfg.end_addr
        )
        .into());
    }

    let length = length.unwrap_or(cfg.end_addr - start);
    if !cfg.contains(start, length as usize) {
        return Err(format!(
            "Range 0x{:08X}+0x{:X} is outside the flash region 0x{:08X}..0x{:08X}",
            start, length, cfg.start_addr, cfg.end_addr
        )
        .into());
    }
    Ok((start, length))
}
