//! Device instance and mount lifecycle
//!
//! A [`DeviceInstance`] is the storage for one flash chip: its name, its
//! configuration and the fixed buffers the filesystem library runs in. It
//! usually lives in a `static` and is created long before the SPI
//! controller is usable. Bringing it up is split in two steps:
//!
//! 1. [`DeviceHandle::register`] claims the instance and returns a token.
//!    No hardware is touched.
//! 2. [`DeviceHandle::activate`] consumes the token once the bus is ready,
//!    mounts the filesystem and returns a [`MountedDevice`] that can be
//!    registered in a host [`DeviceTable`](crate::vfs::DeviceTable).
//!
//! A failed activation leaves nothing mounted; the token is gone, so there
//! is no retry path.

mod error;
mod instance;
mod mount;

pub use error::MountError;
pub use instance::DeviceInstance;
pub use mount::{DeviceHandle, MountedDevice};
