//! Bus transaction recorder

use alloc::vec::Vec;

use spiflash_fs_core::bus::{CommandFlags, SpiBus};
use spiflash_fs_core::error::Result;
use spiflash_fs_core::spi::AddressWidth;

/// One call to [`SpiBus::command`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Bytes shifted out
    pub tx: Vec<u8>,
    /// Bytes shifted in
    pub rx: Vec<u8>,
    /// Flags the call was made with
    pub flags: CommandFlags,
}

/// One chip-select session: consecutive merged calls joined together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// All bytes shifted out during the session
    pub tx: Vec<u8>,
    /// Number of bytes shifted in
    pub rx_len: usize,
}

impl Session {
    /// Command opcode, if anything was sent
    pub fn opcode(&self) -> Option<u8> {
        self.tx.first().copied()
    }

    /// Address following the opcode
    pub fn address(&self, width: AddressWidth) -> Option<u32> {
        self.tx.get(1..).and_then(|addr| width.decode(addr).ok())
    }

    /// Bytes following opcode and address
    pub fn payload(&self, width: AddressWidth) -> &[u8] {
        self.tx.get(1 + width.bytes()..).unwrap_or(&[])
    }
}

/// Bus wrapper recording every transaction passed to the inner bus
pub struct RecordingBus<B> {
    inner: B,
    log: Vec<Transaction>,
}

impl<B: SpiBus> RecordingBus<B> {
    /// Wrap a bus
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            log: Vec::new(),
        }
    }

    /// All recorded calls
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Recorded calls grouped into chip-select sessions
    pub fn sessions(&self) -> Vec<Session> {
        let mut sessions = Vec::new();
        let mut open: Option<Session> = None;

        for t in &self.log {
            let session = open.get_or_insert_with(|| Session {
                tx: Vec::new(),
                rx_len: 0,
            });
            session.tx.extend_from_slice(&t.tx);
            session.rx_len += t.rx.len();

            if !t.flags.contains(CommandFlags::MERGE) {
                sessions.extend(open.take());
            }
        }
        sessions.extend(open);
        sessions
    }

    /// Sessions starting with `opcode`
    pub fn sessions_with(&self, opcode: u8) -> Vec<Session> {
        self.sessions()
            .into_iter()
            .filter(|s| s.opcode() == Some(opcode))
            .collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.log.clear();
    }

    /// Get the wrapped bus
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Get the wrapped bus mutably
    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    /// Consume the recorder and return the wrapped bus
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: SpiBus> SpiBus for RecordingBus<B> {
    fn command(&mut self, target: u8, tx: &[u8], rx: &mut [u8], flags: CommandFlags) -> Result<()> {
        let res = self.inner.command(target, tx, rx, flags);
        self.log.push(Transaction {
            tx: tx.to_vec(),
            rx: rx.to_vec(),
            flags,
        });
        res
    }

    fn delay_us(&mut self, us: u32) {
        self.inner.delay_us(us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DummyChip;
    use spiflash_fs_core::spi::opcodes;

    #[test]
    fn test_sessions_join_merged_calls() {
        let mut bus = RecordingBus::new(DummyChip::new_default());
        let none = CommandFlags::empty();
        bus.command(0, &[opcodes::WREN], &mut [], none).unwrap();
        bus.command(0, &[opcodes::PP, 0, 1, 0], &mut [], CommandFlags::MERGE)
            .unwrap();
        bus.command(0, &[9, 8, 7], &mut [], none).unwrap();
        bus.command(0, &[opcodes::RDSR], &mut [0], none).unwrap();

        assert_eq!(bus.transactions().len(), 4);
        let sessions = bus.sessions();
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[1].opcode(), Some(opcodes::PP));
        assert_eq!(sessions[1].address(AddressWidth::ThreeByte), Some(0x100));
        assert_eq!(sessions[1].payload(AddressWidth::ThreeByte), &[9, 8, 7]);
        assert_eq!(sessions[2].rx_len, 1);
        assert_eq!(bus.sessions_with(opcodes::WREN).len(), 1);
    }
}
