//! Host I/O layer boundary
//!
//! This module models the descriptor-style I/O layer the mounted device is
//! exposed through: its errno vocabulary, POSIX-style open flags, the
//! `stat` record, the [`FileBackend`] capability set a device implements,
//! and the [`DeviceTable`] that routes path-based calls to devices.

mod backend;
mod errno;
mod flags;
mod io;
mod table;

pub use backend::{FileBackend, Stat};
pub use errno::Errno;
pub use flags::{AccessMode, OpenFlags};
pub use io::File;
pub use table::{Descriptor, DeviceTable};

pub use crate::fs::Whence;
