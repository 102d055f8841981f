//! Library error to errno mapping

use crate::fs::FsError;
use crate::vfs::Errno;

/// Map a library error onto the host's errno vocabulary
///
/// Codes without a closer host equivalent become `ENOTSUP`.
pub fn errno_from(err: FsError) -> Errno {
    match err {
        FsError::NotFound | FsError::Deleted => Errno::ENOENT,
        FsError::Full => Errno::ENOSPC,
        FsError::OutOfFileDescs => Errno::EMFILE,
        FsError::BadDescriptor
        | FsError::FileClosed
        | FsError::FileDeleted
        | FsError::NotReadable
        | FsError::NotWritable => Errno::EBADF,
        FsError::FileExists | FsError::ConflictingName => Errno::EEXIST,
        FsError::NameTooLong => Errno::ENAMETOOLONG,
        FsError::SeekBounds | FsError::EndOfObject => Errno::EINVAL,
        FsError::NotMounted
        | FsError::NotAFs
        | FsError::NotConfigured
        | FsError::EraseFail
        | FsError::Internal
        | FsError::Hal => Errno::EIO,
        FsError::ReadOnly => Errno::EROFS,
        FsError::Mounted | FsError::NotAFile | FsError::Other(_) => Errno::ENOTSUP,
    }
}

impl From<FsError> for Errno {
    fn from(err: FsError) -> Self {
        errno_from(err)
    }
}
