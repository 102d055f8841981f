//! spiflash-fs-dummy - In-memory flash emulation for testing
//!
//! This crate provides collaborators for exercising the storage driver
//! without hardware:
//!
//! - [`DummyChip`] - a NOR chip emulated in memory behind [`SpiBus`]
//! - [`RecordingBus`] - a bus wrapper that records every transaction
//! - [`MemFs`] - a small reference implementation of [`FlashFs`]
//!
//! [`SpiBus`]: spiflash_fs_core::bus::SpiBus
//! [`FlashFs`]: spiflash_fs_core::fs::FlashFs

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
mod chip;
#[cfg(feature = "alloc")]
mod memfs;
#[cfg(feature = "alloc")]
mod recorder;

#[cfg(feature = "alloc")]
pub use chip::{ChipStats, DummyChip, DummyConfig};
#[cfg(feature = "alloc")]
pub use memfs::MemFs;
#[cfg(feature = "alloc")]
pub use recorder::{RecordingBus, Session, Transaction};
