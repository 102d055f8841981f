//! Mount errors

use core::fmt;

use crate::error::Error;
use crate::fs::FsError;

/// Reasons a device failed to activate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountError {
    /// Configuration or buffer sizes were rejected before mounting
    InvalidConfig(Error),
    /// The filesystem library refused to mount
    Library(FsError),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(e) => write!(f, "invalid device configuration: {}", e),
            Self::Library(e) => write!(f, "filesystem mount failed: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MountError {}

impl From<FsError> for MountError {
    fn from(e: FsError) -> Self {
        Self::Library(e)
    }
}
