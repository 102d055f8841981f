//! Flash geometry and command configuration
//!
//! A [`FlashConfig`] describes where the filesystem lives on the chip, how
//! the chip is erased and programmed, which opcodes it speaks and how long
//! the driver may wait for it. Everything is `const` constructible so a
//! board crate can keep its configuration in a `static`.
//!
//! With the `std` feature the same structure can be loaded from a TOML file,
//! see [`FlashConfig::from_toml_str`].

#[cfg(feature = "std")]
mod toml;

#[cfg(feature = "std")]
pub use self::toml::ConfigError;

use crate::error::{Error, Result};
use crate::spi::{opcodes, AddressWidth};

/// Opcode set used by the protocol driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcodes {
    /// Read data
    pub read: u8,
    /// Page program
    pub write: u8,
    /// Erase one erase block
    pub erase: u8,
    /// Set the write enable latch
    pub write_enable: u8,
    /// Read status register
    pub read_status: u8,
}

impl Opcodes {
    /// Standard 3-byte address opcodes with 64 KiB block erase
    pub const JEDEC_3B: Self = Self {
        read: opcodes::READ,
        write: opcodes::PP,
        erase: opcodes::BE_D8,
        write_enable: opcodes::WREN,
        read_status: opcodes::RDSR,
    };

    /// Native 4-byte address opcodes with 64 KiB block erase
    pub const JEDEC_4B: Self = Self {
        read: opcodes::READ_4B,
        write: opcodes::PP_4B,
        erase: opcodes::BE_DC,
        write_enable: opcodes::WREN,
        read_status: opcodes::RDSR,
    };
}

/// Status polling budget for one busy-wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyPolicy {
    /// Delay between status register polls, in microseconds
    pub poll_delay_us: u32,
    /// Number of polls before the chip is declared unresponsive
    pub max_polls: u32,
}

impl BusyPolicy {
    /// Page program: poll every 10us, give up after 10ms (typical is 0.7-5ms)
    pub const PAGE_PROGRAM: Self = Self {
        poll_delay_us: 10,
        max_polls: 1_000,
    };

    /// 64 KiB block erase: poll every 10ms, give up after 4s
    pub const BLOCK_ERASE: Self = Self {
        poll_delay_us: 10_000,
        max_polls: 400,
    };

    /// Total time budget in microseconds
    pub const fn timeout_us(&self) -> u64 {
        self.poll_delay_us as u64 * self.max_polls as u64
    }
}

/// Flash region, geometry and command configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashConfig {
    /// First physical byte of the filesystem region
    pub start_addr: u32,
    /// One past the last physical byte of the filesystem region
    pub end_addr: u32,
    /// Physical erase block size
    pub erase_block_size: u32,
    /// Logical block size used by the filesystem
    pub log_block_size: u32,
    /// Logical page size used by the filesystem
    pub log_page_size: u32,
    /// Page program width of the chip
    pub write_page_size: u32,
    /// Address bytes sent after each addressed opcode
    pub address_width: AddressWidth,
    /// Opcodes spoken by the chip
    pub opcodes: Opcodes,
    /// Chip select / target number on the bus
    pub target: u8,
    /// Busy-wait budget after a page program
    pub program_wait: BusyPolicy,
    /// Busy-wait budget after a block erase, also used for the idle check
    /// before every read, write or erase
    pub erase_wait: BusyPolicy,
}

impl FlashConfig {
    /// 16 MiB region on a 3-byte address part with 64 KiB erase blocks
    pub const DEFAULT: Self = Self {
        start_addr: 0,
        end_addr: 16 * 1024 * 1024,
        erase_block_size: 64 * 1024,
        log_block_size: 64 * 1024,
        log_page_size: 256,
        write_page_size: 256,
        address_width: AddressWidth::ThreeByte,
        opcodes: Opcodes::JEDEC_3B,
        target: 0,
        program_wait: BusyPolicy::PAGE_PROGRAM,
        erase_wait: BusyPolicy::BLOCK_ERASE,
    };

    /// Set the physical region `[start, end)`
    pub const fn with_region(mut self, start: u32, end: u32) -> Self {
        self.start_addr = start;
        self.end_addr = end;
        self
    }

    /// Set erase block and logical block/page sizes
    pub const fn with_geometry(mut self, erase_block: u32, log_block: u32, log_page: u32) -> Self {
        self.erase_block_size = erase_block;
        self.log_block_size = log_block;
        self.log_page_size = log_page;
        self
    }

    /// Set the page program width
    pub const fn with_write_page(mut self, size: u32) -> Self {
        self.write_page_size = size;
        self
    }

    /// Set the address width and the matching standard opcode set
    pub const fn with_address_width(mut self, width: AddressWidth) -> Self {
        self.address_width = width;
        self.opcodes = match width {
            AddressWidth::ThreeByte => Opcodes::JEDEC_3B,
            AddressWidth::FourByte => Opcodes::JEDEC_4B,
        };
        self
    }

    /// Override the opcode set
    pub const fn with_opcodes(mut self, opcodes: Opcodes) -> Self {
        self.opcodes = opcodes;
        self
    }

    /// Set the chip select number
    pub const fn with_target(mut self, target: u8) -> Self {
        self.target = target;
        self
    }

    /// Size of the physical region in bytes
    pub const fn phys_size(&self) -> u32 {
        self.end_addr.saturating_sub(self.start_addr)
    }

    /// Number of erase blocks in the region
    pub const fn block_count(&self) -> u32 {
        if self.erase_block_size == 0 {
            0
        } else {
            self.phys_size() / self.erase_block_size
        }
    }

    /// Check if `[addr, addr + len)` lies inside the region
    pub fn contains(&self, addr: u32, len: usize) -> bool {
        let end = addr as u64 + len as u64;
        addr >= self.start_addr && end <= self.end_addr as u64
    }

    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let pow2 = |v: u32| v != 0 && v.is_power_of_two();

        if self.end_addr <= self.start_addr {
            log::error!(
                "Empty flash region 0x{:08X}..0x{:08X}",
                self.start_addr,
                self.end_addr
            );
            return Err(Error::InvalidConfig);
        }
        if self.end_addr as u64 > self.address_width.limit() {
            log::error!(
                "Region end 0x{:08X} not addressable with {} address bytes",
                self.end_addr,
                self.address_width.bytes()
            );
            return Err(Error::InvalidConfig);
        }
        if !pow2(self.erase_block_size) || !pow2(self.write_page_size) || !pow2(self.log_page_size)
        {
            log::error!("Erase block, write page and log page sizes must be powers of two");
            return Err(Error::InvalidConfig);
        }
        if self.log_block_size == 0
            || self.log_block_size % self.erase_block_size != 0
            || self.log_block_size % self.log_page_size != 0
        {
            log::error!(
                "Log block size {} must be a multiple of the erase block ({}) and log page ({})",
                self.log_block_size,
                self.erase_block_size,
                self.log_page_size
            );
            return Err(Error::InvalidConfig);
        }
        if self.start_addr % self.erase_block_size != 0 || self.phys_size() % self.log_block_size != 0
        {
            log::error!("Flash region must be aligned to whole logical blocks");
            return Err(Error::InvalidAlignment);
        }
        if self.program_wait.max_polls == 0 || self.erase_wait.max_polls == 0 {
            log::error!("Busy-wait budget must allow at least one poll");
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(FlashConfig::DEFAULT.validate(), Ok(()));
        assert_eq!(FlashConfig::DEFAULT.phys_size(), 16 * 1024 * 1024);
        assert_eq!(FlashConfig::DEFAULT.block_count(), 256);
    }

    #[test]
    fn test_region_beyond_three_byte_range() {
        let cfg = FlashConfig::DEFAULT.with_region(0, 32 * 1024 * 1024);
        assert_eq!(cfg.validate(), Err(Error::InvalidConfig));

        let cfg = cfg.with_address_width(AddressWidth::FourByte);
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.opcodes, Opcodes::JEDEC_4B);
    }

    #[test]
    fn test_misaligned_region() {
        let cfg = FlashConfig::DEFAULT.with_region(0x1000, 0x1000 + 0x20000);
        assert_eq!(cfg.validate(), Err(Error::InvalidAlignment));
    }

    #[test]
    fn test_non_power_of_two_page() {
        let cfg = FlashConfig::DEFAULT.with_write_page(200);
        assert_eq!(cfg.validate(), Err(Error::InvalidConfig));
    }

    #[test]
    fn test_contains() {
        let cfg = FlashConfig::DEFAULT.with_region(0x10000, 0x30000);
        assert!(cfg.contains(0x10000, 0x20000));
        assert!(!cfg.contains(0x0FFFF, 1));
        assert!(!cfg.contains(0x2FFFF, 2));
    }
}
