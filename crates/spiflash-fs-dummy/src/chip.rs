//! Emulated NOR chip

use alloc::vec;
use alloc::vec::Vec;

use spiflash_fs_core::bus::{CommandFlags, SpiBus};
use spiflash_fs_core::error::{Error, Result};
use spiflash_fs_core::spi::{opcodes, AddressWidth};

/// Configuration for the emulated chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Flash size in bytes
    pub size: usize,
    /// Page program width
    pub page_size: usize,
    /// Status reads reporting busy after a page program
    pub program_busy_polls: u32,
    /// Status reads reporting busy after an erase
    pub erase_busy_polls: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            size: 16 * 1024 * 1024,
            page_size: 256,
            program_busy_polls: 2,
            erase_busy_polls: 5,
        }
    }
}

/// Command counters of a [`DummyChip`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChipStats {
    /// Read commands
    pub reads: usize,
    /// Page program commands
    pub programs: usize,
    /// Erase commands
    pub erases: usize,
    /// Write enable commands
    pub write_enables: usize,
    /// Status register reads
    pub status_polls: usize,
}

/// NOR flash chip emulated in memory
///
/// Behaves like a real part as far as the driver can observe: commands are
/// only decoded once chip select is released, programming can only clear
/// bits and wraps inside the page, erase works on aligned blocks, the write
/// enable latch is cleared by every program or erase, and the chip reports
/// busy for a configurable number of status polls afterwards.
///
/// Misuse that a real chip would silently ignore (commands while busy,
/// program/erase without write enable, page overruns) is ignored as well
/// and counted in [`DummyChip::violations`].
pub struct DummyChip {
    config: DummyConfig,
    data: Vec<u8>,
    write_enabled: bool,
    busy: u32,
    stuck: bool,
    session: Option<Vec<u8>>,
    violations: usize,
    fault_after: Option<usize>,
    stats: ChipStats,
}

impl DummyChip {
    /// Create an erased chip
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            write_enabled: false,
            busy: 0,
            stuck: false,
            session: None,
            violations: 0,
            fault_after: None,
            stats: ChipStats::default(),
        }
    }

    /// Create a chip with the default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a chip with pre-filled contents
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut chip = Self::new(config);
        let len = core::cmp::min(initial_data.len(), chip.data.len());
        chip.data[..len].copy_from_slice(&initial_data[..len]);
        chip
    }

    /// Get the chip contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the chip contents mutably
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Number of protocol violations seen so far
    pub fn violations(&self) -> usize {
        self.violations
    }

    /// Command counters
    pub fn stats(&self) -> ChipStats {
        self.stats
    }

    /// Whether the write enable latch is set
    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Keep the busy bit set forever, or release it
    pub fn set_stuck(&mut self, stuck: bool) {
        self.stuck = stuck;
    }

    /// Fail every bus call after `calls` more successful ones
    pub fn inject_fault(&mut self, calls: Option<usize>) {
        self.fault_after = calls;
    }

    fn is_busy(&self) -> bool {
        self.stuck || self.busy > 0
    }

    fn violation(&mut self, what: &str) {
        self.violations += 1;
        log::warn!("dummy chip: {}", what);
    }

    fn decode_address(&mut self, tx: &[u8], width: AddressWidth) -> Option<usize> {
        match tx.get(1..).map(|addr| width.decode(addr)) {
            Some(Ok(addr)) => Some(addr as usize % self.data.len()),
            _ => {
                self.violation("command too short for its address");
                None
            }
        }
    }

    fn execute(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        let Some(&opcode) = tx.first() else {
            return Ok(());
        };

        if opcode == opcodes::RDSR {
            self.stats.status_polls += 1;
            let mut status = 0;
            if self.is_busy() {
                status |= opcodes::SR1_WIP;
            }
            if self.write_enabled {
                status |= opcodes::SR1_WEL;
            }
            rx.fill(status);
            self.busy = self.busy.saturating_sub(1);
            return Ok(());
        }

        if self.is_busy() {
            self.violation("command issued while busy");
            return Ok(());
        }

        match opcode {
            opcodes::WREN => {
                self.stats.write_enables += 1;
                self.write_enabled = true;
                Ok(())
            }
            opcodes::WRDI => {
                self.write_enabled = false;
                Ok(())
            }
            opcodes::READ => self.handle_read(tx, rx, AddressWidth::ThreeByte),
            opcodes::READ_4B => self.handle_read(tx, rx, AddressWidth::FourByte),
            opcodes::PP => self.handle_page_program(tx, AddressWidth::ThreeByte),
            opcodes::PP_4B => self.handle_page_program(tx, AddressWidth::FourByte),
            opcodes::SE_20 => self.handle_erase(tx, AddressWidth::ThreeByte, 4 * 1024),
            opcodes::SE_21 => self.handle_erase(tx, AddressWidth::FourByte, 4 * 1024),
            opcodes::BE_52 => self.handle_erase(tx, AddressWidth::ThreeByte, 32 * 1024),
            opcodes::BE_5C => self.handle_erase(tx, AddressWidth::FourByte, 32 * 1024),
            opcodes::BE_D8 => self.handle_erase(tx, AddressWidth::ThreeByte, 64 * 1024),
            opcodes::BE_DC => self.handle_erase(tx, AddressWidth::FourByte, 64 * 1024),
            _ => Err(Error::OpcodeNotSupported),
        }
    }

    fn handle_read(&mut self, tx: &[u8], rx: &mut [u8], width: AddressWidth) -> Result<()> {
        let Some(addr) = self.decode_address(tx, width) else {
            return Ok(());
        };
        self.stats.reads += 1;

        // Sequential reads wrap around the end of the array
        let size = self.data.len();
        for (i, byte) in rx.iter_mut().enumerate() {
            *byte = self.data[(addr + i) % size];
        }
        Ok(())
    }

    fn handle_page_program(&mut self, tx: &[u8], width: AddressWidth) -> Result<()> {
        let Some(addr) = self.decode_address(tx, width) else {
            return Ok(());
        };
        if !self.write_enabled {
            self.violation("page program without write enable");
            return Ok(());
        }
        self.stats.programs += 1;

        let page = self.config.page_size;
        let data = &tx[1 + width.bytes()..];
        if addr % page + data.len() > page {
            self.violation("page program crosses a page boundary");
        }

        // Programming can only change 1 -> 0 and wraps inside the page
        let base = addr - addr % page;
        for (i, &byte) in data.iter().enumerate() {
            let target = base + (addr % page + i) % page;
            self.data[target] &= byte;
        }

        self.write_enabled = false;
        self.busy = self.config.program_busy_polls;
        Ok(())
    }

    fn handle_erase(&mut self, tx: &[u8], width: AddressWidth, erase_size: usize) -> Result<()> {
        let Some(addr) = self.decode_address(tx, width) else {
            return Ok(());
        };
        if !self.write_enabled {
            self.violation("erase without write enable");
            return Ok(());
        }
        self.stats.erases += 1;

        let aligned = addr & !(erase_size - 1);
        let end = core::cmp::min(aligned + erase_size, self.data.len());
        self.data[aligned..end].fill(0xFF);

        self.write_enabled = false;
        self.busy = self.config.erase_busy_polls;
        Ok(())
    }
}

impl SpiBus for DummyChip {
    fn command(&mut self, _target: u8, tx: &[u8], rx: &mut [u8], flags: CommandFlags) -> Result<()> {
        if let Some(left) = self.fault_after.as_mut() {
            if *left == 0 {
                self.session = None;
                return Err(Error::BusFault);
            }
            *left -= 1;
        }

        if flags.contains(CommandFlags::MERGE) {
            if !rx.is_empty() {
                rx.fill(0xFF);
            }
            self.session.get_or_insert_with(Vec::new).extend_from_slice(tx);
            return Ok(());
        }

        match self.session.take() {
            Some(mut merged) => {
                merged.extend_from_slice(tx);
                self.execute(&merged, rx)
            }
            None => self.execute(tx, rx),
        }
    }
}
