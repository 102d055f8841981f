//! Device table and descriptor routing

use heapless::Vec;

use super::{AccessMode, Errno, FileBackend, OpenFlags, Stat, Whence};
use crate::bridge::FileHandle;

/// An open file in a [`DeviceTable`]
///
/// Holds the index of the device that opened it and the device's private
/// handle. The descriptor is consumed by [`DeviceTable::close`].
#[derive(Debug, PartialEq, Eq)]
pub struct Descriptor {
    device: usize,
    handle: FileHandle,
    flags: OpenFlags,
}

impl Descriptor {
    /// Index of the owning device in the table
    pub fn device(&self) -> usize {
        self.device
    }

    /// The device's private handle
    pub fn handle(&self) -> &FileHandle {
        &self.handle
    }

    /// Flags the file was opened with
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// Access mode the file was opened with
    pub fn access(&self) -> AccessMode {
        self.flags.access_mode()
    }
}

/// Registry of named devices, routing path-based calls by name prefix
///
/// A path belongs to the device with the longest name that equals the path
/// or is followed in it by a `/`.
pub struct DeviceTable<'a, const N: usize> {
    devices: Vec<&'a mut dyn FileBackend, N>,
}

impl<'a, const N: usize> Default for DeviceTable<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> DeviceTable<'a, N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Number of registered devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device is registered
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Register a device under its name
    ///
    /// # Errors
    /// * `EINVAL` - the name does not start with `/`
    /// * `EEXIST` - a device with the same name is registered
    /// * `ENOSPC` - the table is full
    pub fn register(&mut self, device: &'a mut dyn FileBackend) -> Result<usize, Errno> {
        let name = device.name();
        if !name.starts_with('/') {
            log::error!("Device name {:?} is not an absolute path", name);
            return Err(Errno::EINVAL);
        }
        if self.devices.iter().any(|d| d.name() == name) {
            log::error!("Device {} already registered", name);
            return Err(Errno::EEXIST);
        }

        log::debug!("Registering device {}", name);
        self.devices.push(device).map_err(|_| Errno::ENOSPC)?;
        Ok(self.devices.len() - 1)
    }

    /// Index of the device a path belongs to
    pub fn find(&self, path: &str) -> Option<usize> {
        self.devices
            .iter()
            .enumerate()
            .filter(|(_, d)| path_matches(d.name(), path))
            .max_by_key(|(_, d)| d.name().len())
            .map(|(idx, _)| idx)
    }

    /// Open a file on the device `path` belongs to
    ///
    /// # Errors
    /// * `ENODEV` - no registered device matches the path
    /// * anything the device reports
    pub fn open(&mut self, path: &str, flags: OpenFlags, mode: u32) -> Result<Descriptor, Errno> {
        let device = self.find(path).ok_or(Errno::ENODEV)?;
        let handle = self.devices[device].open(path, flags, mode)?;
        Ok(Descriptor {
            device,
            handle,
            flags,
        })
    }

    /// Close a descriptor
    pub fn close(&mut self, desc: Descriptor) -> Result<(), Errno> {
        self.backend(&desc)?.close(desc.handle)
    }

    /// Read through a descriptor
    ///
    /// # Errors
    /// * `EBADF` - the file was opened write-only
    pub fn read(&mut self, desc: &Descriptor, buf: &mut [u8]) -> Result<usize, Errno> {
        if !desc.access().can_read() {
            return Err(Errno::EBADF);
        }
        self.backend(desc)?.read(&desc.handle, buf)
    }

    /// Write through a descriptor
    ///
    /// # Errors
    /// * `EBADF` - the file was opened read-only
    pub fn write(&mut self, desc: &Descriptor, data: &[u8]) -> Result<usize, Errno> {
        if !desc.access().can_write() {
            return Err(Errno::EBADF);
        }
        self.backend(desc)?.write(&desc.handle, data)
    }

    /// Reposition a descriptor
    pub fn lseek(&mut self, desc: &Descriptor, offset: i32, whence: Whence) -> Result<u32, Errno> {
        self.backend(desc)?.seek(&desc.handle, offset, whence)
    }

    /// Query metadata through a descriptor
    pub fn fstat(&mut self, desc: &Descriptor) -> Result<Stat, Errno> {
        self.backend(desc)?.stat(&desc.handle)
    }

    /// Send a control request through a descriptor
    pub fn ioctl(&mut self, desc: &Descriptor, request: u32, arg: usize) -> Result<i32, Errno> {
        self.backend(desc)?.ioctl(&desc.handle, request, arg)
    }

    fn backend(&mut self, desc: &Descriptor) -> Result<&mut (dyn FileBackend + 'a), Errno> {
        match self.devices.get_mut(desc.device) {
            Some(dev) => Ok(&mut **dev),
            None => Err(Errno::EBADF),
        }
    }
}

fn path_matches(name: &str, path: &str) -> bool {
    match path.strip_prefix(name) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || name.ends_with('/'),
        None => false,
    }
}
