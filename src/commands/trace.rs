//! Trace command implementation

use spiflash_fs_core::bus::SpiBus;
use spiflash_fs_core::config::FlashConfig;
use spiflash_fs_core::flash::{FlashHal, SpiFlashDevice};
use spiflash_fs_core::spi::opcodes;
use spiflash_fs_dummy::{RecordingBus, Session};

use crate::cli::TraceCommands;

/// Run a driver operation and print the bus sessions it produced
pub fn run_trace<B: SpiBus>(
    bus: B,
    cfg: FlashConfig,
    op: &TraceCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dev = SpiFlashDevice::new(RecordingBus::new(bus), cfg)?;

    let result = match op {
        TraceCommands::Read { start, length } => {
            let mut buf = vec![0u8; *length as usize];
            dev.read(*start, &mut buf)
        }
        TraceCommands::Write { start, data } => dev.write(*start, data.as_bytes()),
        TraceCommands::Erase { start, length } => dev.erase(*start, *length),
    };

    let sessions = dev.bus().sessions();
    for (i, s) in sessions.iter().enumerate() {
        println!("{:4}  {}", i, describe(s, &cfg));
    }
    println!();
    println!(
        "{} sessions, {} bus calls",
        sessions.len(),
        dev.bus().transactions().len()
    );

    result?;
    Ok(())
}

fn describe(s: &Session, cfg: &FlashConfig) -> String {
    let width = cfg.address_width;
    let op = cfg.opcodes;

    match s.opcode() {
        None => "(empty)".to_string(),
        Some(code) if code == op.read_status => "RDSR".to_string(),
        Some(code) if code == op.write_enable => "WREN".to_string(),
        Some(opcodes::WRDI) => "WRDI".to_string(),
        Some(code) if code == op.read => format!(
            "READ  0x{:08X} rx {}",
            s.address(width).unwrap_or(0),
            s.rx_len
        ),
        Some(code) if code == op.write => format!(
            "PP    0x{:08X} tx {}",
            s.address(width).unwrap_or(0),
            s.payload(width).len()
        ),
        Some(code) if code == op.erase => {
            format!("ERASE 0x{:08X}", s.address(width).unwrap_or(0))
        }
        Some(code) => format!("0x{:02X}  tx {} rx {}", code, s.tx.len(), s.rx_len),
    }
}
