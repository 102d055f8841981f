//! SPI flash protocol driver
//!
//! This module provides `SpiFlashDevice`, which owns the bus connection to
//! one NOR chip and implements [`FlashHal`] on top of the SPI25 sequences.

use crate::bus::SpiBus;
use crate::config::FlashConfig;
use crate::error::{Error, Result};
use crate::flash::hal::FlashHal;
use crate::protocol;

/// Flash driver for a NOR chip on a [`SpiBus`]
///
/// Writes are split so no page program crosses a write page boundary, and
/// erases are issued one erase block at a time. The chip is always waited
/// on before a command is issued and after every destructive command.
///
/// # Example
///
/// ```ignore
/// use spiflash_fs_core::flash::{FlashHal, SpiFlashDevice};
///
/// let mut flash = SpiFlashDevice::new(bus, FlashConfig::DEFAULT)?;
/// flash.erase(0, 64 * 1024)?;
/// flash.write(0x10, b"hello")?;
/// ```
pub struct SpiFlashDevice<B: SpiBus> {
    bus: B,
    cfg: FlashConfig,
}

impl<B: SpiBus> SpiFlashDevice<B> {
    /// Create a new driver
    ///
    /// # Arguments
    /// * `bus` - The bus the chip is attached to
    /// * `cfg` - Region, geometry and opcodes of the chip
    ///
    /// # Errors
    /// Returns the [`FlashConfig::validate`] error if the configuration is
    /// inconsistent, e.g. a zero or non power of two write page.
    pub fn new(bus: B, cfg: FlashConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { bus, cfg })
    }

    /// Get the flash configuration
    pub fn config(&self) -> &FlashConfig {
        &self.cfg
    }

    /// Get a reference to the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a mutable reference to the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the driver and return the bus
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Read the status register
    pub fn status(&mut self) -> Result<u8> {
        protocol::read_status(&mut self.bus, &self.cfg)
    }

    /// A previous erase may still be running, so this uses the erase budget
    fn ensure_idle(&mut self) -> Result<()> {
        protocol::wait_ready(&mut self.bus, &self.cfg, self.cfg.erase_wait).map(|_| ())
    }

    fn check_range(&self, addr: u32, len: usize) -> Result<()> {
        if self.cfg.contains(addr, len) {
            Ok(())
        } else {
            log::error!(
                "Access 0x{:08X}+0x{:X} outside flash region 0x{:08X}..0x{:08X}",
                addr,
                len,
                self.cfg.start_addr,
                self.cfg.end_addr
            );
            Err(Error::AddressOutOfBounds)
        }
    }
}

impl<B: SpiBus> FlashHal for SpiFlashDevice<B> {
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.check_range(addr, buf.len())?;
        self.ensure_idle()?;

        log::trace!("R 0x{:x},0x{:x}", addr, buf.len());
        protocol::read_data(&mut self.bus, &self.cfg, addr, buf)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        self.check_range(addr, data.len())?;
        if data.is_empty() {
            return Ok(());
        }
        self.ensure_idle()?;

        let page_size = self.cfg.write_page_size;
        let mut addr = addr;
        let mut remaining = data;

        while !remaining.is_empty() {
            let to_boundary = (page_size - addr % page_size) as usize;
            let chunk_len = core::cmp::min(to_boundary, remaining.len());
            let (chunk, rest) = remaining.split_at(chunk_len);

            log::trace!("W 0x{:x},0x{:x}", addr, chunk_len);
            protocol::program_page(&mut self.bus, &self.cfg, addr, chunk)?;

            addr += chunk_len as u32;
            remaining = rest;
        }

        Ok(())
    }

    fn erase(&mut self, addr: u32, size: u32) -> Result<()> {
        let block = self.cfg.erase_block_size;

        self.check_range(addr, size as usize)?;
        if size < block {
            if size > 0 {
                log::warn!(
                    "Ignoring erase of 0x{:X} bytes at 0x{:08X}: smaller than one erase block",
                    size,
                    addr
                );
            }
            return Ok(());
        }
        if addr % block != 0 {
            log::error!("Erase address 0x{:08X} is not block aligned", addr);
            return Err(Error::InvalidAlignment);
        }
        self.ensure_idle()?;

        let mut addr = addr;
        let mut size = size;
        while size >= block {
            log::trace!("E 0x{:x}", addr);
            protocol::erase_block(&mut self.bus, &self.cfg, addr)?;
            size -= block;
            addr += block;
        }

        if size > 0 {
            log::warn!("Erase remainder of 0x{:X} bytes at 0x{:08X} ignored", size, addr);
        }
        Ok(())
    }
}
