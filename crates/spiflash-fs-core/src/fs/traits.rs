//! Filesystem library trait

use super::{FsBuffers, FsConfig, FsError, FsFile, FsFlags, FsStat, Whence};
use crate::flash::FlashHal;

/// A mounted flash filesystem instance
///
/// `mount` hands the library its raw flash access and the buffers it will
/// own for its whole lifetime; every other method operates on the mounted
/// instance. Failures carry the library's own [`FsError`] vocabulary, which
/// callers translate into their error model.
pub trait FlashFs<'a>: Sized {
    /// Raw flash access the library performs all physical I/O through
    type Hal: FlashHal;

    /// Mount the filesystem found on flash
    ///
    /// # Errors
    /// * `NotAFs` - flash does not hold a usable filesystem
    /// * `NotConfigured` - geometry or buffers are unusable
    /// * `Hal` - raw flash access failed
    fn mount(config: &FsConfig, hal: Self::Hal, buffers: FsBuffers<'a>) -> Result<Self, FsError>;

    /// Open (and optionally create) the object at `path`
    fn open(&mut self, path: &str, flags: FsFlags, mode: u32) -> Result<FsFile, FsError>;

    /// Close an open file
    fn close(&mut self, file: FsFile) -> Result<(), FsError>;

    /// Read from the current position, returning the number of bytes read
    ///
    /// Reading at the end of the object fails with `EndOfObject`.
    fn read(&mut self, file: FsFile, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Write at the current position, returning the number of bytes written
    fn write(&mut self, file: FsFile, data: &[u8]) -> Result<usize, FsError>;

    /// Move the file position, returning the new absolute position
    fn lseek(&mut self, file: FsFile, offset: i32, whence: Whence) -> Result<u32, FsError>;

    /// Query object metadata
    fn fstat(&mut self, file: FsFile) -> Result<FsStat, FsError>;
}
