//! Per-descriptor private data

use crate::fs::FsFile;

/// The library's file handle, stored in a host descriptor
///
/// Created by a successful open and consumed by close, so a handle cannot
/// be used after its file was released through the same descriptor.
#[derive(Debug, PartialEq, Eq)]
pub struct FileHandle(FsFile);

impl FileHandle {
    /// Wrap a native library handle
    pub const fn new(file: FsFile) -> Self {
        Self(file)
    }

    /// The native library handle
    pub const fn file(&self) -> FsFile {
        self.0
    }
}
