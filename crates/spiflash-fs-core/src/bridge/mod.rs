//! File-descriptor bridge
//!
//! [`FsBridge`] exposes a mounted [`FlashFs`](crate::fs::FlashFs) to the
//! host I/O layer by implementing [`FileBackend`](crate::vfs::FileBackend).
//! It owns the translations between the two worlds: path prefixes, open
//! flags and error numbers.

mod errno;
mod flags;
mod handle;

pub use errno::errno_from;
pub use flags::translate_flags;
pub use handle::FileHandle;

use crate::fs::{FlashFs, FsError};
use crate::vfs::{Errno, FileBackend, OpenFlags, Stat, Whence};

/// Adapter from a mounted filesystem to the host's descriptor interface
pub struct FsBridge<F> {
    name: &'static str,
    fs: F,
}

impl<F> FsBridge<F> {
    /// Wrap a mounted filesystem registered under `name`
    pub const fn new(name: &'static str, fs: F) -> Self {
        Self { name, fs }
    }

    /// Get the mounted filesystem
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Get the mounted filesystem mutably
    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Consume the bridge and return the filesystem
    pub fn into_inner(self) -> F {
        self.fs
    }

    /// Strip the device name and its separator from a host path
    ///
    /// Returns `None` when the path does not belong to this device.
    pub fn library_path<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_prefix(self.name)?.strip_prefix('/')
    }
}

impl<'a, F: FlashFs<'a>> FileBackend for FsBridge<F> {
    fn name(&self) -> &str {
        self.name
    }

    fn open(&mut self, path: &str, flags: OpenFlags, mode: u32) -> Result<FileHandle, Errno> {
        let lib_path = self.library_path(path).ok_or(Errno::ENOENT)?;
        let fs_flags = translate_flags(flags);

        match self.fs.open(lib_path, fs_flags, mode) {
            Ok(file) => Ok(FileHandle::new(file)),
            Err(e) => {
                log::debug!("open {} ({:?}) failed: {}", path, fs_flags, e);
                Err(errno_from(e))
            }
        }
    }

    fn close(&mut self, handle: FileHandle) -> Result<(), Errno> {
        if let Err(e) = self.fs.close(handle.file()) {
            log::warn!("close of {:?} on {} failed: {}", handle.file(), self.name, e);
        }
        Ok(())
    }

    fn read(&mut self, handle: &FileHandle, buf: &mut [u8]) -> Result<usize, Errno> {
        match self.fs.read(handle.file(), buf) {
            Ok(n) => Ok(n),
            Err(FsError::EndOfObject) => Ok(0),
            Err(e) => Err(errno_from(e)),
        }
    }

    fn write(&mut self, handle: &FileHandle, data: &[u8]) -> Result<usize, Errno> {
        self.fs.write(handle.file(), data).map_err(errno_from)
    }

    fn seek(&mut self, handle: &FileHandle, offset: i32, whence: Whence) -> Result<u32, Errno> {
        self.fs
            .lseek(handle.file(), offset, whence)
            .map_err(errno_from)
    }

    fn stat(&mut self, handle: &FileHandle) -> Result<Stat, Errno> {
        let st = self.fs.fstat(handle.file()).map_err(errno_from)?;
        Ok(Stat {
            st_ino: u32::from(st.obj_id),
            st_size: i64::from(st.size),
            ..Stat::default()
        })
    }

    fn ioctl(&mut self, _handle: &FileHandle, _request: u32, _arg: usize) -> Result<i32, Errno> {
        Err(Errno::ENOSYS)
    }
}
