//! Raw flash access for the filesystem library
//!
//! This module provides the [`FlashHal`] callback interface the filesystem
//! library performs all physical I/O through, and [`SpiFlashDevice`], the
//! SPI NOR implementation of it.

mod hal;
mod spi_device;

pub use hal::FlashHal;
pub use spi_device::SpiFlashDevice;
