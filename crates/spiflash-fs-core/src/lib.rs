//! spiflash-fs-core - SPI NOR flash storage backend
//!
//! This crate exposes a byte-addressable SPI NOR flash chip as a mountable
//! storage device for a flash filesystem library, and bridges that library's
//! file objects to a descriptor-style host I/O layer. It is designed to be
//! `no_std` compatible for use on bare-metal targets.
//!
//! # Layers
//!
//! - [`spi`] / [`protocol`] - command encoding and SPI25 sequences
//! - [`flash`] - the raw read/write/erase driver handed to the filesystem
//! - [`fs`] - the boundary to the external flash filesystem library
//! - [`vfs`] - the boundary to the host I/O layer (errno, flags, device table)
//! - [`bridge`] - maps host file operations onto filesystem objects
//! - [`device`] - device instance and two-phase mount lifecycle
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`, TOML config)
//! - `alloc` - Enable heap allocation
//!
//! # Example
//!
//! ```ignore
//! use spiflash_fs_core::device::{DeviceHandle, DeviceInstance};
//! use spiflash_fs_core::vfs::{DeviceTable, OpenFlags};
//!
//! static mut FLASH: DeviceInstance<512, 64, 264> = DeviceInstance::new("/mnt/spiffs", CONFIG);
//!
//! // Early startup, before the bus controller is up
//! let token = DeviceHandle::register(unsafe { &mut *core::ptr::addr_of_mut!(FLASH) });
//!
//! // Later, once the SPI controller is ready
//! let mut mounted = token.activate::<MyFs<_>, _>(bus)?;
//! let mut table: DeviceTable<'_, 4> = DeviceTable::new();
//! table.register(&mut mounted)?;
//! let fd = table.open("/mnt/spiffs/log.txt", OpenFlags::WRONLY | OpenFlags::CREAT, 0)?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bridge;
pub mod bus;
pub mod config;
pub mod device;
pub mod error;
pub mod flash;
pub mod fs;
pub mod protocol;
pub mod spi;
pub mod vfs;

pub use error::{Error, Result};
