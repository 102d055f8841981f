//! Info command implementation

use spiflash_fs_core::config::FlashConfig;
use spiflash_fs_core::fs::{work_buf_size, FsConfig};

/// Print the flash configuration
pub fn print_info(cfg: &FlashConfig) {
    let fs = FsConfig::from(cfg);

    println!("Flash Configuration");
    println!("===================");
    println!();
    println!(
        "Region:          0x{:08X}..0x{:08X} ({} bytes)",
        cfg.start_addr,
        cfg.end_addr,
        cfg.phys_size()
    );
    println!(
        "Erase block:     {} bytes ({} blocks)",
        cfg.erase_block_size,
        cfg.block_count()
    );
    println!("Logical block:   {} bytes", fs.log_block_size);
    println!("Logical page:    {} bytes", fs.log_page_size);
    println!("Write page:      {} bytes", cfg.write_page_size);
    println!("Address width:   {} bytes", cfg.address_width.bytes());
    println!("Bus target:      {}", cfg.target);
    println!();
    println!("Opcodes:");
    println!("  Read:          0x{:02X}", cfg.opcodes.read);
    println!("  Page program:  0x{:02X}", cfg.opcodes.write);
    println!("  Block erase:   0x{:02X}", cfg.opcodes.erase);
    println!("  Write enable:  0x{:02X}", cfg.opcodes.write_enable);
    println!("  Read status:   0x{:02X}", cfg.opcodes.read_status);
    println!();
    println!(
        "Program wait:    {} polls every {} us (timeout {} us)",
        cfg.program_wait.max_polls,
        cfg.program_wait.poll_delay_us,
        cfg.program_wait.timeout_us()
    );
    println!(
        "Erase wait:      {} polls every {} us (timeout {} us)",
        cfg.erase_wait.max_polls,
        cfg.erase_wait.poll_delay_us,
        cfg.erase_wait.timeout_us()
    );
    println!();
    println!(
        "Work buffer:     >= {} bytes",
        work_buf_size(fs.log_page_size as usize)
    );
}
