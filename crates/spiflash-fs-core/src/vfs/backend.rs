//! Device capability set

use super::{Errno, OpenFlags, Whence};
use crate::bridge::FileHandle;

/// File metadata reported to the host I/O layer
///
/// Fields the backend cannot fill stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    /// Device identifier
    pub st_dev: u32,
    /// Inode (object) number
    pub st_ino: u32,
    /// File type and permissions
    pub st_mode: u32,
    /// Hard link count
    pub st_nlink: u32,
    /// Owner user id
    pub st_uid: u32,
    /// Owner group id
    pub st_gid: u32,
    /// Size in bytes
    pub st_size: i64,
    /// Preferred I/O block size
    pub st_blksize: u32,
    /// Allocated blocks
    pub st_blocks: u32,
    /// Last access time
    pub st_atime: i64,
    /// Last modification time
    pub st_mtime: i64,
    /// Last status change time
    pub st_ctime: i64,
}

/// A device that can be registered in a [`DeviceTable`](super::DeviceTable)
///
/// Every method receives the descriptor's private data: the handle the
/// device itself returned from `open`. Failures are reported as [`Errno`].
pub trait FileBackend {
    /// Name the device is registered under, a path prefix such as `/mnt/flash`
    fn name(&self) -> &str;

    /// Open `path`, which still carries the device name prefix
    fn open(&mut self, path: &str, flags: OpenFlags, mode: u32) -> Result<FileHandle, Errno>;

    /// Release an open file
    fn close(&mut self, handle: FileHandle) -> Result<(), Errno>;

    /// Read from the file, `Ok(0)` at end of file
    fn read(&mut self, handle: &FileHandle, buf: &mut [u8]) -> Result<usize, Errno>;

    /// Write to the file
    fn write(&mut self, handle: &FileHandle, data: &[u8]) -> Result<usize, Errno>;

    /// Move the file position, returning the new absolute position
    fn seek(&mut self, handle: &FileHandle, offset: i32, whence: Whence) -> Result<u32, Errno>;

    /// Query file metadata
    fn stat(&mut self, handle: &FileHandle) -> Result<Stat, Errno>;

    /// Device-specific control request
    fn ioctl(&mut self, _handle: &FileHandle, _request: u32, _arg: usize) -> Result<i32, Errno> {
        Err(Errno::ENOTTY)
    }
}

impl<T: FileBackend + ?Sized> FileBackend for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&mut self, path: &str, flags: OpenFlags, mode: u32) -> Result<FileHandle, Errno> {
        (**self).open(path, flags, mode)
    }

    fn close(&mut self, handle: FileHandle) -> Result<(), Errno> {
        (**self).close(handle)
    }

    fn read(&mut self, handle: &FileHandle, buf: &mut [u8]) -> Result<usize, Errno> {
        (**self).read(handle, buf)
    }

    fn write(&mut self, handle: &FileHandle, data: &[u8]) -> Result<usize, Errno> {
        (**self).write(handle, data)
    }

    fn seek(&mut self, handle: &FileHandle, offset: i32, whence: Whence) -> Result<u32, Errno> {
        (**self).seek(handle, offset, whence)
    }

    fn stat(&mut self, handle: &FileHandle) -> Result<Stat, Errno> {
        (**self).stat(handle)
    }

    fn ioctl(&mut self, handle: &FileHandle, request: u32, arg: usize) -> Result<i32, Errno> {
        (**self).ioctl(handle, request, arg)
    }
}
