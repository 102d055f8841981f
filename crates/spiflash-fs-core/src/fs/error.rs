//! Filesystem library error codes

use core::fmt;

/// Errors reported by the flash filesystem library
///
/// Each variant carries the library's numeric code (see [`FsError::code`]),
/// so codes coming from a foreign implementation can be converted with
/// [`FsError::from_code`] without losing information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// Filesystem is not mounted
    NotMounted,
    /// No free space left
    Full,
    /// Object does not exist
    NotFound,
    /// Read or seek past the end of the object
    EndOfObject,
    /// Object has been deleted
    Deleted,
    /// Out of file descriptors
    OutOfFileDescs,
    /// Descriptor refers to a closed file
    FileClosed,
    /// Descriptor refers to a deleted file
    FileDeleted,
    /// Descriptor is not valid
    BadDescriptor,
    /// File was not opened for writing
    NotWritable,
    /// File was not opened for reading
    NotReadable,
    /// Another object already uses this name
    ConflictingName,
    /// Configuration is missing or incomplete
    NotConfigured,
    /// Flash does not hold a valid filesystem
    NotAFs,
    /// Filesystem is already mounted
    Mounted,
    /// Erase of a block failed
    EraseFail,
    /// Exclusive create of an existing file
    FileExists,
    /// Object is not a regular file
    NotAFile,
    /// Operation not implemented in a read-only build
    ReadOnly,
    /// Object name is too long
    NameTooLong,
    /// Seek target is out of bounds
    SeekBounds,
    /// Raw flash access failed
    Hal,
    /// Internal consistency error (index/data span mismatch and similar)
    Internal,
    /// Any code not known to this crate
    Other(i32),
}

impl FsError {
    /// The library's numeric error code
    pub const fn code(&self) -> i32 {
        match self {
            Self::NotMounted => -10000,
            Self::Full => -10001,
            Self::NotFound => -10002,
            Self::EndOfObject => -10003,
            Self::Deleted => -10004,
            Self::OutOfFileDescs => -10007,
            Self::FileClosed => -10008,
            Self::FileDeleted => -10009,
            Self::BadDescriptor => -10010,
            Self::NotWritable => -10021,
            Self::NotReadable => -10022,
            Self::ConflictingName => -10023,
            Self::NotConfigured => -10024,
            Self::NotAFs => -10025,
            Self::Mounted => -10026,
            Self::EraseFail => -10027,
            Self::FileExists => -10030,
            Self::NotAFile => -10031,
            Self::ReadOnly => -10032,
            Self::NameTooLong => -10036,
            Self::SeekBounds => -10040,
            Self::Internal => -10050,
            Self::Hal => -10100,
            Self::Other(code) => *code,
        }
    }

    /// Convert a numeric library code back into an error
    pub const fn from_code(code: i32) -> Self {
        match code {
            -10000 => Self::NotMounted,
            -10001 => Self::Full,
            -10002 => Self::NotFound,
            -10003 => Self::EndOfObject,
            -10004 => Self::Deleted,
            -10007 => Self::OutOfFileDescs,
            -10008 => Self::FileClosed,
            -10009 => Self::FileDeleted,
            -10010 => Self::BadDescriptor,
            -10021 => Self::NotWritable,
            -10022 => Self::NotReadable,
            -10023 => Self::ConflictingName,
            -10024 => Self::NotConfigured,
            -10025 => Self::NotAFs,
            -10026 => Self::Mounted,
            -10027 => Self::EraseFail,
            -10030 => Self::FileExists,
            -10031 => Self::NotAFile,
            -10032 => Self::ReadOnly,
            -10036 => Self::NameTooLong,
            -10040 => Self::SeekBounds,
            -10050 => Self::Internal,
            -10100 => Self::Hal,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMounted => write!(f, "filesystem not mounted"),
            Self::Full => write!(f, "filesystem full"),
            Self::NotFound => write!(f, "object not found"),
            Self::EndOfObject => write!(f, "end of object"),
            Self::Deleted => write!(f, "object deleted"),
            Self::OutOfFileDescs => write!(f, "out of file descriptors"),
            Self::FileClosed => write!(f, "file closed"),
            Self::FileDeleted => write!(f, "file deleted"),
            Self::BadDescriptor => write!(f, "bad file descriptor"),
            Self::NotWritable => write!(f, "file not writable"),
            Self::NotReadable => write!(f, "file not readable"),
            Self::ConflictingName => write!(f, "conflicting name"),
            Self::NotConfigured => write!(f, "filesystem not configured"),
            Self::NotAFs => write!(f, "not a filesystem"),
            Self::Mounted => write!(f, "filesystem already mounted"),
            Self::EraseFail => write!(f, "erase failed"),
            Self::FileExists => write!(f, "file exists"),
            Self::NotAFile => write!(f, "not a file"),
            Self::ReadOnly => write!(f, "read-only filesystem"),
            Self::NameTooLong => write!(f, "name too long"),
            Self::SeekBounds => write!(f, "seek out of bounds"),
            Self::Hal => write!(f, "flash access failed"),
            Self::Internal => write!(f, "internal filesystem error"),
            Self::Other(code) => write!(f, "filesystem error {}", code),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_for_known_codes() {
        for code in -10100..=-10000 {
            assert_eq!(FsError::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        assert_eq!(FsError::from_code(-10005), FsError::Other(-10005));
        assert_eq!(FsError::from_code(-1).code(), -1);
    }
}
