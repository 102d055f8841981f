//! Per-chip storage

use crate::config::FlashConfig;

/// Mountable storage for one flash chip
///
/// `WORK`, `FDS` and `CACHE` are the sizes in bytes of the work buffer,
/// the open file table and the page cache handed to the filesystem library.
/// See [`work_buf_size`](crate::fs::work_buf_size),
/// [`fd_table_size`](crate::fs::fd_table_size) and
/// [`cache_size`](crate::fs::cache_size) for sizing them.
pub struct DeviceInstance<const WORK: usize, const FDS: usize, const CACHE: usize> {
    pub(crate) name: &'static str,
    pub(crate) config: FlashConfig,
    pub(crate) work: [u8; WORK],
    pub(crate) fds: [u8; FDS],
    pub(crate) cache: [u8; CACHE],
}

impl<const WORK: usize, const FDS: usize, const CACHE: usize> DeviceInstance<WORK, FDS, CACHE> {
    /// Create an instance, usable in a `static` initializer
    ///
    /// # Arguments
    /// * `name` - Path prefix the device is registered under, e.g. `/mnt/flash`
    /// * `config` - Flash region, geometry and opcodes
    pub const fn new(name: &'static str, config: FlashConfig) -> Self {
        Self {
            name,
            config,
            work: [0; WORK],
            fds: [0; FDS],
            cache: [0; CACHE],
        }
    }

    /// Name the device is registered under
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Flash configuration
    pub fn config(&self) -> &FlashConfig {
        &self.config
    }
}
