//! Raw flash callback trait

use crate::error::Result;

/// Raw read/write/erase primitives handed to the filesystem library
///
/// All addresses are physical byte offsets on the chip.
pub trait FlashHal {
    /// Read flash contents into `buf`
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()>;

    /// Program `data` at `addr`
    ///
    /// The target bytes should be erased first; programming can only clear
    /// bits. Page splitting is handled by the implementation.
    fn write(&mut self, addr: u32, data: &[u8]) -> Result<()>;

    /// Erase `size` bytes starting at `addr`
    ///
    /// Callers must only request block-aligned spans that are a multiple of
    /// the erase block size.
    fn erase(&mut self, addr: u32, size: u32) -> Result<()>;
}

impl<H: FlashHal + ?Sized> FlashHal for &mut H {
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        (**self).read(addr, buf)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        (**self).write(addr, data)
    }

    fn erase(&mut self, addr: u32, size: u32) -> Result<()> {
        (**self).erase(addr, size)
    }
}
