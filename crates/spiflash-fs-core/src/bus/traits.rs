//! Bus trait definitions

use crate::error::Result;
use bitflags::bitflags;

bitflags! {
    /// Per-transaction flags for [`SpiBus::command`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommandFlags: u8 {
        /// Keep chip select asserted after this call so the next call
        /// continues the same bus transaction
        const MERGE = 1 << 0;
    }
}

impl Default for CommandFlags {
    fn default() -> Self {
        CommandFlags::empty()
    }
}

/// SPI bus controller trait
///
/// A single call shifts out `tx`, then shifts `rx.len()` bytes in, as one
/// chip-select session. Passing [`CommandFlags::MERGE`] defers chip-select
/// release so that a following call extends the same session; this is how a
/// page-program header and its data are sent without copying them into one
/// buffer.
///
/// ## Example
///
/// ```ignore
/// impl SpiBus for AvalonSpi {
///     fn command(&mut self, target: u8, tx: &[u8], rx: &mut [u8], flags: CommandFlags) -> Result<()> {
///         self.select(target);
///         self.shift_out(tx)?;
///         self.shift_in(rx)?;
///         if !flags.contains(CommandFlags::MERGE) {
///             self.deselect();
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait SpiBus {
    /// Execute one (possibly merged) bus transaction against `target`
    ///
    /// Returns [`Error::BusFault`](crate::Error::BusFault) if the controller
    /// could not complete the transfer.
    fn command(&mut self, target: u8, tx: &[u8], rx: &mut [u8], flags: CommandFlags)
        -> Result<()>;

    /// Delay for the specified number of microseconds
    ///
    /// Used to pace status register polling. The default does not wait.
    fn delay_us(&mut self, _us: u32) {}
}

impl<B: SpiBus + ?Sized> SpiBus for &mut B {
    fn command(
        &mut self,
        target: u8,
        tx: &[u8],
        rx: &mut [u8],
        flags: CommandFlags,
    ) -> Result<()> {
        (**self).command(target, tx, rx, flags)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

// Blanket impl for boxed buses to allow trait objects
#[cfg(feature = "alloc")]
impl SpiBus for alloc::boxed::Box<dyn SpiBus + Send> {
    fn command(
        &mut self,
        target: u8,
        tx: &[u8],
        rx: &mut [u8],
        flags: CommandFlags,
    ) -> Result<()> {
        (**self).command(target, tx, rx, flags)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}
