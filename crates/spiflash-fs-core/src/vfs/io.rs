//! `embedded-io` adapter for open files

use embedded_io::{ErrorType, Read, Seek, SeekFrom, Write};

use super::{Descriptor, DeviceTable, Errno, OpenFlags, Stat, Whence};

/// An open file borrowed from a [`DeviceTable`]
///
/// Implements the `embedded-io` traits so generic readers and writers can
/// run on top of a mounted device. The file is closed when dropped; call
/// [`File::close`] to observe the close result.
pub struct File<'t, 'a, const N: usize> {
    table: &'t mut DeviceTable<'a, N>,
    desc: Option<Descriptor>,
}

impl<'t, 'a, const N: usize> File<'t, 'a, N> {
    /// Open `path` through the table
    pub fn open(
        table: &'t mut DeviceTable<'a, N>,
        path: &str,
        flags: OpenFlags,
        mode: u32,
    ) -> Result<Self, Errno> {
        let desc = table.open(path, flags, mode)?;
        Ok(Self {
            table,
            desc: Some(desc),
        })
    }

    /// Query file metadata
    pub fn stat(&mut self) -> Result<Stat, Errno> {
        let desc = self.desc.as_ref().ok_or(Errno::EBADF)?;
        self.table.fstat(desc)
    }

    /// Close the file
    pub fn close(mut self) -> Result<(), Errno> {
        match self.desc.take() {
            Some(desc) => self.table.close(desc),
            None => Ok(()),
        }
    }
}

impl<const N: usize> Drop for File<'_, '_, N> {
    fn drop(&mut self) {
        if let Some(desc) = self.desc.take() {
            if let Err(e) = self.table.close(desc) {
                log::warn!("Closing file on drop failed: {}", e);
            }
        }
    }
}

impl<const N: usize> ErrorType for File<'_, '_, N> {
    type Error = Errno;
}

impl<const N: usize> Read for File<'_, '_, N> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        let desc = self.desc.as_ref().ok_or(Errno::EBADF)?;
        self.table.read(desc, buf)
    }
}

impl<const N: usize> Write for File<'_, '_, N> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Errno> {
        let desc = self.desc.as_ref().ok_or(Errno::EBADF)?;
        self.table.write(desc, buf)
    }

    fn flush(&mut self) -> Result<(), Errno> {
        Ok(())
    }
}

impl<const N: usize> Seek for File<'_, '_, N> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Errno> {
        let (offset, whence) = match pos {
            SeekFrom::Start(off) => (i32::try_from(off).map_err(|_| Errno::EINVAL)?, Whence::Set),
            SeekFrom::Current(off) => (i32::try_from(off).map_err(|_| Errno::EINVAL)?, Whence::Cur),
            SeekFrom::End(off) => (i32::try_from(off).map_err(|_| Errno::EINVAL)?, Whence::End),
        };
        let desc = self.desc.as_ref().ok_or(Errno::EBADF)?;
        self.table.lseek(desc, offset, whence).map(u64::from)
    }
}
