//! Bus command structure

use super::AddressWidth;

/// Maximum encoded header length: one opcode plus a 4-byte address
pub const MAX_HEADER_LEN: usize = 5;

/// One logical bus transaction header: an opcode and an optional address
///
/// Commands are transient values built fresh for every transaction and
/// encoded into a fixed-size byte sequence, so no allocation is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusCommand {
    /// The opcode byte
    pub opcode: u8,

    /// Address (if any)
    pub address: Option<u32>,

    /// Address width, only meaningful when `address` is set
    pub address_width: AddressWidth,
}

impl BusCommand {
    /// Create a simple command with no address (e.g., WREN, RDSR)
    pub const fn simple(opcode: u8) -> Self {
        Self {
            opcode,
            address: None,
            address_width: AddressWidth::ThreeByte,
        }
    }

    /// Create an addressed command (e.g., READ, PP, BE)
    pub const fn addressed(opcode: u8, address: u32, address_width: AddressWidth) -> Self {
        Self {
            opcode,
            address: Some(address),
            address_width,
        }
    }

    /// Returns true if this command has an address phase
    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }

    /// Number of header bytes on the wire
    pub fn header_len(&self) -> usize {
        match self.address {
            Some(_) => 1 + self.address_width.bytes(),
            None => 1,
        }
    }

    /// Encode opcode and address into their wire representation
    pub fn encode(&self) -> EncodedCommand {
        let mut bytes = [0u8; MAX_HEADER_LEN];
        bytes[0] = self.opcode;
        if let Some(addr) = self.address {
            let width = self.address_width.bytes();
            bytes[1..=width].copy_from_slice(&addr.to_be_bytes()[4 - width..]);
        }
        EncodedCommand {
            bytes,
            len: self.header_len(),
        }
    }
}

/// Wire bytes of an encoded [`BusCommand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedCommand {
    bytes: [u8; MAX_HEADER_LEN],
    len: usize,
}

impl EncodedCommand {
    /// The encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::opcodes;

    #[test]
    fn test_simple_command() {
        let cmd = BusCommand::simple(opcodes::WREN);
        assert!(!cmd.has_address());
        assert_eq!(cmd.encode().as_bytes(), &[0x06]);
    }

    #[test]
    fn test_addressed_three_byte() {
        let cmd = BusCommand::addressed(opcodes::READ, 0x01_0203, AddressWidth::ThreeByte);
        assert_eq!(cmd.header_len(), 4);
        assert_eq!(cmd.encode().as_bytes(), &[0x03, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_addressed_four_byte() {
        let cmd = BusCommand::addressed(opcodes::PP_4B, 0x0A0B_0C0D, AddressWidth::FourByte);
        assert_eq!(cmd.encode().as_bytes(), &[0x12, 0x0A, 0x0B, 0x0C, 0x0D]);
    }
}
