//! Open flag translation

use crate::fs::FsFlags;
use crate::vfs::OpenFlags;

/// Translate host open flags into library flags
///
/// The access mode maps to exactly one of `WRONLY`, `RDWR` or `RDONLY`, with
/// write-only taking precedence if both host mode bits are set. `APPEND`,
/// `CREAT`, `TRUNC` and `EXCL` are added independently.
pub fn translate_flags(flags: OpenFlags) -> FsFlags {
    let mut out = if flags.contains(OpenFlags::WRONLY) {
        FsFlags::WRONLY
    } else if flags.contains(OpenFlags::RDWR) {
        FsFlags::RDWR
    } else {
        FsFlags::RDONLY
    };

    if flags.contains(OpenFlags::APPEND) {
        out |= FsFlags::APPEND;
    }
    if flags.contains(OpenFlags::CREAT) {
        out |= FsFlags::CREAT;
    }
    if flags.contains(OpenFlags::TRUNC) {
        out |= FsFlags::TRUNC;
    }
    if flags.contains(OpenFlags::EXCL) {
        out |= FsFlags::EXCL;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_modes() {
        assert_eq!(translate_flags(OpenFlags::RDONLY), FsFlags::RDONLY);
        assert_eq!(translate_flags(OpenFlags::WRONLY), FsFlags::WRONLY);
        assert_eq!(translate_flags(OpenFlags::RDWR), FsFlags::RDWR);
        assert_eq!(translate_flags(OpenFlags::ACCMODE), FsFlags::WRONLY);
    }

    #[test]
    fn test_modifiers_are_additive() {
        let flags = OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::TRUNC | OpenFlags::EXCL;
        assert_eq!(
            translate_flags(flags),
            FsFlags::WRONLY | FsFlags::CREAT | FsFlags::TRUNC | FsFlags::EXCL
        );
        assert_eq!(
            translate_flags(OpenFlags::APPEND),
            FsFlags::RDONLY | FsFlags::APPEND
        );
    }
}
