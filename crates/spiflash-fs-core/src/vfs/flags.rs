//! POSIX-style open flags

use bitflags::bitflags;

bitflags! {
    /// Open flags passed by the host I/O layer
    ///
    /// Values follow newlib's `fcntl.h`. Read-only access is the absence of
    /// both access mode bits, see [`OpenFlags::RDONLY`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        /// Open for writing only
        const WRONLY = 0x0001;
        /// Open for reading and writing
        const RDWR   = 0x0002;
        /// Writes append to the end of the file
        const APPEND = 0x0008;
        /// Create the file if it does not exist
        const CREAT  = 0x0200;
        /// Truncate the file to zero length
        const TRUNC  = 0x0400;
        /// Fail if the file exists (with `CREAT`)
        const EXCL   = 0x0800;
    }
}

impl OpenFlags {
    /// Open for reading only
    pub const RDONLY: Self = Self::empty();

    /// Mask of the access mode bits
    pub const ACCMODE: Self = Self::WRONLY.union(Self::RDWR);

    /// Access mode requested by these flags
    ///
    /// Write-only takes precedence when both mode bits are set.
    pub fn access_mode(&self) -> AccessMode {
        if self.contains(Self::WRONLY) {
            AccessMode::WriteOnly
        } else if self.contains(Self::RDWR) {
            AccessMode::ReadWrite
        } else {
            AccessMode::ReadOnly
        }
    }
}

/// Access mode of an open file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Reads only
    ReadOnly,
    /// Writes only
    WriteOnly,
    /// Reads and writes
    ReadWrite,
}

impl AccessMode {
    /// Whether reads are allowed
    pub fn can_read(&self) -> bool {
        !matches!(self, Self::WriteOnly)
    }

    /// Whether writes are allowed
    pub fn can_write(&self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_mode() {
        assert_eq!(OpenFlags::RDONLY.access_mode(), AccessMode::ReadOnly);
        assert_eq!(
            (OpenFlags::WRONLY | OpenFlags::CREAT).access_mode(),
            AccessMode::WriteOnly
        );
        assert_eq!(OpenFlags::RDWR.access_mode(), AccessMode::ReadWrite);
        assert_eq!(OpenFlags::ACCMODE.access_mode(), AccessMode::WriteOnly);
    }

    #[test]
    fn test_permissions() {
        assert!(AccessMode::ReadOnly.can_read());
        assert!(!AccessMode::ReadOnly.can_write());
        assert!(!AccessMode::WriteOnly.can_read());
        assert!(AccessMode::ReadWrite.can_read() && AccessMode::ReadWrite.can_write());
    }
}
