//! Two-phase activation

use super::{DeviceInstance, MountError};
use crate::bridge::{FileHandle, FsBridge};
use crate::bus::SpiBus;
use crate::config::FlashConfig;
use crate::error::Error;
use crate::flash::SpiFlashDevice;
use crate::fs::{work_buf_size, FlashFs, FsBuffers, FsConfig, FD_ENTRY_SIZE};
use crate::vfs::{Errno, FileBackend, OpenFlags, Stat, Whence};

/// A registered device waiting for its bus
///
/// Returned by [`DeviceHandle::register`] and consumed by
/// [`DeviceHandle::activate`]. Holding the token keeps the instance
/// exclusively borrowed, so it cannot be registered twice.
pub struct DeviceHandle<'a, const WORK: usize, const FDS: usize, const CACHE: usize> {
    instance: &'a mut DeviceInstance<WORK, FDS, CACHE>,
}

impl<'a, const WORK: usize, const FDS: usize, const CACHE: usize> DeviceHandle<'a, WORK, FDS, CACHE> {
    /// Claim a device instance for later activation
    ///
    /// Performs no hardware access.
    pub fn register(instance: &'a mut DeviceInstance<WORK, FDS, CACHE>) -> Self {
        log::debug!("Registered flash device {}", instance.name);
        Self { instance }
    }

    /// Name of the registered device
    pub fn name(&self) -> &'static str {
        self.instance.name
    }

    /// Mount the filesystem on the registered device
    ///
    /// Validates the configuration and buffer sizes, builds the protocol
    /// driver over `bus` and mounts `F` with the instance's buffers.
    ///
    /// # Errors
    /// * `InvalidConfig` - the configuration or a buffer size was rejected;
    ///   the library was not called
    /// * `Library` - the library failed to mount
    pub fn activate<F, B>(self, bus: B) -> Result<MountedDevice<F>, MountError>
    where
        B: SpiBus,
        F: FlashFs<'a, Hal = SpiFlashDevice<B>>,
    {
        let DeviceInstance {
            name,
            config,
            work,
            fds,
            cache,
        } = self.instance;
        let name: &'static str = *name;
        let config = *config;

        config.validate().map_err(|e| {
            log::error!("{}: rejecting flash configuration: {}", name, e);
            MountError::InvalidConfig(e)
        })?;
        check_buffers(name, &config, WORK, FDS, CACHE)?;

        let fs_config = FsConfig::from(&config);
        log::debug!(
            "{}: mounting 0x{:08X}+0x{:X}, erase block 0x{:X}, log block 0x{:X}, log page 0x{:X}",
            name,
            fs_config.phys_addr,
            fs_config.phys_size,
            fs_config.phys_erase_block,
            fs_config.log_block_size,
            fs_config.log_page_size
        );

        let hal = SpiFlashDevice::new(bus, config).map_err(MountError::InvalidConfig)?;
        let buffers = FsBuffers {
            work: &mut work[..],
            fds: &mut fds[..],
            cache: &mut cache[..],
        };

        match F::mount(&fs_config, hal, buffers) {
            Ok(fs) => {
                log::debug!("{}: mounted", name);
                Ok(MountedDevice {
                    config,
                    bridge: FsBridge::new(name, fs),
                })
            }
            Err(e) => {
                log::error!("{}: mount failed: {}", name, e);
                Err(MountError::Library(e))
            }
        }
    }
}

fn check_buffers(
    name: &str,
    config: &FlashConfig,
    work: usize,
    fds: usize,
    cache: usize,
) -> Result<(), MountError> {
    let log_page = config.log_page_size as usize;

    if work < work_buf_size(log_page) {
        log::error!(
            "{}: work buffer of {} bytes, need {}",
            name,
            work,
            work_buf_size(log_page)
        );
        return Err(MountError::InvalidConfig(Error::BufferTooSmall));
    }
    if cache < log_page {
        log::error!("{}: cache of {} bytes, need {}", name, cache, log_page);
        return Err(MountError::InvalidConfig(Error::BufferTooSmall));
    }
    if fds < FD_ENTRY_SIZE {
        log::error!("{}: file table of {} bytes holds no descriptor", name, fds);
        return Err(MountError::InvalidConfig(Error::BufferTooSmall));
    }
    Ok(())
}

/// A device with a mounted filesystem
///
/// Implements [`FileBackend`] so it can be registered in a host device
/// table. It stays mounted for as long as it lives.
pub struct MountedDevice<F> {
    config: FlashConfig,
    bridge: FsBridge<F>,
}

impl<F> MountedDevice<F> {
    /// Flash configuration the device was mounted with
    pub fn config(&self) -> &FlashConfig {
        &self.config
    }

    /// Get the mounted filesystem
    pub fn fs(&self) -> &F {
        self.bridge.fs()
    }

    /// Get the mounted filesystem mutably
    pub fn fs_mut(&mut self) -> &mut F {
        self.bridge.fs_mut()
    }
}

impl<'a, F: FlashFs<'a>> FileBackend for MountedDevice<F> {
    fn name(&self) -> &str {
        self.bridge.name()
    }

    fn open(&mut self, path: &str, flags: OpenFlags, mode: u32) -> Result<FileHandle, Errno> {
        self.bridge.open(path, flags, mode)
    }

    fn close(&mut self, handle: FileHandle) -> Result<(), Errno> {
        self.bridge.close(handle)
    }

    fn read(&mut self, handle: &FileHandle, buf: &mut [u8]) -> Result<usize, Errno> {
        self.bridge.read(handle, buf)
    }

    fn write(&mut self, handle: &FileHandle, data: &[u8]) -> Result<usize, Errno> {
        self.bridge.write(handle, data)
    }

    fn seek(&mut self, handle: &FileHandle, offset: i32, whence: Whence) -> Result<u32, Errno> {
        self.bridge.seek(handle, offset, whence)
    }

    fn stat(&mut self, handle: &FileHandle) -> Result<Stat, Errno> {
        self.bridge.stat(handle)
    }

    fn ioctl(&mut self, handle: &FileHandle, request: u32, arg: usize) -> Result<i32, Errno> {
        self.bridge.ioctl(handle, request, arg)
    }
}
