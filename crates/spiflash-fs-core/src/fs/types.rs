//! Filesystem library types

use bitflags::bitflags;

use crate::config::FlashConfig;

/// Maximum object name length stored by the library, including the
/// terminating byte it reserves
pub const OBJ_NAME_LEN: usize = 32;

/// Bytes the library needs per open file descriptor
pub const FD_ENTRY_SIZE: usize = 32;

/// Size of the work buffer the library needs for a logical page size
pub const fn work_buf_size(log_page_size: usize) -> usize {
    2 * log_page_size
}

/// Size of a descriptor table able to hold `max_files` open files
pub const fn fd_table_size(max_files: usize) -> usize {
    max_files * FD_ENTRY_SIZE
}

/// Size of a cache buffer holding `pages` logical pages
pub const fn cache_size(log_page_size: usize, pages: usize) -> usize {
    // Each cached page carries a small header
    pages * (log_page_size + 32) + 32
}

bitflags! {
    /// Open flags understood by the filesystem library
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FsFlags: u16 {
        /// Writes go to the end of the file
        const APPEND = 1 << 0;
        /// Truncate the file on open
        const TRUNC  = 1 << 1;
        /// Create the file if it does not exist
        const CREAT  = 1 << 2;
        /// Open for reading
        const RDONLY = 1 << 3;
        /// Open for writing
        const WRONLY = 1 << 4;
        /// Open for reading and writing
        const RDWR   = Self::RDONLY.bits() | Self::WRONLY.bits();
        /// Bypass the cache
        const DIRECT = 1 << 5;
        /// Fail if the file already exists (with `CREAT`)
        const EXCL   = 1 << 6;
    }
}

/// Native file handle of the filesystem library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FsFile(pub i16);

/// Seek origin
///
/// The numeric values are shared by the host I/O layer and the library,
/// so seek requests pass through without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Whence {
    /// From the start of the file
    Set = 0,
    /// From the current position
    Cur = 1,
    /// From the end of the file
    End = 2,
}

impl Whence {
    /// Convert a raw `SEEK_*` value
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Set),
            1 => Some(Self::Cur),
            2 => Some(Self::End),
            _ => None,
        }
    }
}

/// Object metadata returned by `fstat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsStat {
    /// Object identifier
    pub obj_id: u16,
    /// Object size in bytes
    pub size: u32,
    /// Object name
    pub name: heapless::String<OBJ_NAME_LEN>,
}

/// Physical layout handed to the library at mount time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsConfig {
    /// First physical byte of the filesystem
    pub phys_addr: u32,
    /// Physical size of the filesystem
    pub phys_size: u32,
    /// Physical erase block size
    pub phys_erase_block: u32,
    /// Logical block size
    pub log_block_size: u32,
    /// Logical page size
    pub log_page_size: u32,
}

impl From<&FlashConfig> for FsConfig {
    fn from(cfg: &FlashConfig) -> Self {
        Self {
            phys_addr: cfg.start_addr,
            phys_size: cfg.phys_size(),
            phys_erase_block: cfg.erase_block_size,
            log_block_size: cfg.log_block_size,
            log_page_size: cfg.log_page_size,
        }
    }
}

/// Caller-owned memory the library runs in after mount
///
/// The library keeps exclusive use of all three buffers for as long as it
/// stays mounted.
#[derive(Debug)]
pub struct FsBuffers<'a> {
    /// Scratch space, at least two logical pages
    pub work: &'a mut [u8],
    /// Open file descriptor table
    pub fds: &'a mut [u8],
    /// Page cache
    pub cache: &'a mut [u8],
}

impl FsBuffers<'_> {
    /// Number of files that can be open at once
    pub fn max_open_files(&self) -> usize {
        self.fds.len() / FD_ENTRY_SIZE
    }
}
