//! Selftest command implementation
//!
//! Mounts the reference filesystem on a scratch chip through the full
//! register/activate lifecycle and runs a create, write, reopen, read and
//! stat cycle through the host device table.

use spiflash_fs_core::config::FlashConfig;
use spiflash_fs_core::device::{DeviceHandle, DeviceInstance};
use spiflash_fs_core::fs::{fd_table_size, FD_ENTRY_SIZE};
use spiflash_fs_core::vfs::{DeviceTable, OpenFlags, Whence};
use spiflash_fs_dummy::{DummyChip, DummyConfig, MemFs};

use crate::image::chip_size;

const MOUNT_POINT: &str = "/selftest";
const TEST_FILE: &str = "/selftest/data.bin";

/// Buffers sized for logical pages up to 4 KiB
type Instance = DeviceInstance<8192, { fd_table_size(4) }, { 4096 + FD_ENTRY_SIZE }>;

/// Run the selftest
pub fn run_selftest(cfg: &FlashConfig, size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut chip = DummyChip::new(DummyConfig {
        size: chip_size(cfg),
        page_size: cfg.write_page_size as usize,
        ..DummyConfig::default()
    });

    let mut instance = Box::new(Instance::new(MOUNT_POINT, *cfg));
    let token = DeviceHandle::register(&mut *instance);
    let mut dev = token.activate::<MemFs<'_, _>, _>(&mut chip)?;
    println!(
        "Mounted {} ({} objects of up to {} bytes)",
        MOUNT_POINT,
        dev.fs().capacity(),
        dev.fs().max_object_size()
    );

    let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    {
        let mut table: DeviceTable<'_, 1> = DeviceTable::new();
        table.register(&mut dev)?;

        let fd = table.open(TEST_FILE, OpenFlags::CREAT | OpenFlags::TRUNC | OpenFlags::WRONLY, 0)?;
        let written = table.write(&fd, &data)?;
        table.close(fd)?;
        println!("Wrote {} bytes to {}", written, TEST_FILE);

        let fd = table.open(TEST_FILE, OpenFlags::RDONLY, 0)?;
        let st = table.fstat(&fd)?;
        println!("Stat: ino {} size {}", st.st_ino, st.st_size);
        if st.st_size != size as i64 {
            return Err(format!("stat reports {} bytes, expected {}", st.st_size, size).into());
        }

        let mut readback = vec![0u8; size];
        let mut filled = 0;
        while filled < size {
            let n = table.read(&fd, &mut readback[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled != size || readback != data {
            return Err(format!("read back {} bytes that differ from what was written", filled).into());
        }

        let end = table.lseek(&fd, 0, Whence::End)?;
        log::debug!("End of {} at {}", TEST_FILE, end);
        table.close(fd)?;
        println!("Read back {} bytes, contents match", filled);
    }

    drop(dev);
    let stats = chip.stats();
    println!(
        "Chip: {} reads, {} programs, {} erases, {} status polls, {} violations",
        stats.reads,
        stats.programs,
        stats.erases,
        stats.status_polls,
        chip.violations()
    );
    if chip.violations() != 0 {
        return Err("protocol violations detected".into());
    }

    println!("Selftest passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selftest_passes_on_small_region() {
        let cfg = FlashConfig::DEFAULT
            .with_region(0, 0x4_0000)
            .with_geometry(0x1_0000, 0x1_0000, 256);
        run_selftest(&cfg, 1000).unwrap();
    }

    #[test]
    fn test_selftest_rejects_oversized_file() {
        let cfg = FlashConfig::DEFAULT
            .with_region(0, 0x4_0000)
            .with_geometry(0x1_0000, 0x1_0000, 256);
        assert!(run_selftest(&cfg, 0x1_0001).is_err());
    }
}
