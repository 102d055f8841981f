//! Host error numbers

use core::fmt;

/// Error numbers of the host C library
///
/// Values follow newlib, the C library of the embedded host this layer is
/// modeled on.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Errno {
    /// No such file or directory
    ENOENT = 2,
    /// I/O error
    EIO = 5,
    /// Bad file number
    EBADF = 9,
    /// Not enough space
    ENOMEM = 12,
    /// Permission denied
    EACCES = 13,
    /// File exists
    EEXIST = 17,
    /// No such device
    ENODEV = 19,
    /// Is a directory
    EISDIR = 21,
    /// Invalid argument
    EINVAL = 22,
    /// Too many open files
    EMFILE = 24,
    /// Not a character device
    ENOTTY = 25,
    /// No space left on device
    ENOSPC = 28,
    /// Read-only file system
    EROFS = 30,
    /// Function not implemented
    ENOSYS = 88,
    /// File or path name too long
    ENAMETOOLONG = 91,
    /// Connection timed out
    ETIMEDOUT = 116,
    /// Not supported
    ENOTSUP = 134,
}

impl Errno {
    /// Numeric errno value
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// The negated value returned by descriptor-level driver hooks
    pub const fn as_neg(self) -> i32 {
        -(self as i32)
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match self {
            Self::ENOENT => "no such file or directory",
            Self::EIO => "I/O error",
            Self::EBADF => "bad file number",
            Self::ENOMEM => "not enough space",
            Self::EACCES => "permission denied",
            Self::EEXIST => "file exists",
            Self::ENODEV => "no such device",
            Self::EISDIR => "is a directory",
            Self::EINVAL => "invalid argument",
            Self::EMFILE => "too many open files",
            Self::ENOTTY => "not a character device",
            Self::ENOSPC => "no space left on device",
            Self::EROFS => "read-only file system",
            Self::ENOSYS => "function not implemented",
            Self::ENAMETOOLONG => "file name too long",
            Self::ETIMEDOUT => "timed out",
            Self::ENOTSUP => "not supported",
        };
        write!(f, "{} ({:?})", desc, self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Errno {}

impl embedded_io::Error for Errno {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_io::ErrorKind;

        match self {
            Self::ENOENT | Self::ENODEV => ErrorKind::NotFound,
            Self::EACCES | Self::EROFS | Self::EBADF => ErrorKind::PermissionDenied,
            Self::EEXIST => ErrorKind::AlreadyExists,
            Self::EINVAL | Self::ENAMETOOLONG | Self::EISDIR => ErrorKind::InvalidInput,
            Self::ENOMEM | Self::ENOSPC | Self::EMFILE => ErrorKind::OutOfMemory,
            Self::ETIMEDOUT => ErrorKind::TimedOut,
            Self::ENOSYS | Self::ENOTSUP | Self::ENOTTY => ErrorKind::Unsupported,
            Self::EIO => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error as _, ErrorKind};

    #[test]
    fn test_codes() {
        assert_eq!(Errno::ENOENT.code(), 2);
        assert_eq!(Errno::ENOSYS.as_neg(), -88);
    }

    #[test]
    fn test_io_kind() {
        assert_eq!(Errno::ENOENT.kind(), ErrorKind::NotFound);
        assert_eq!(Errno::ENOSPC.kind(), ErrorKind::OutOfMemory);
        assert_eq!(Errno::ENOSYS.kind(), ErrorKind::Unsupported);
    }
}
