//! Address width types

use crate::error::{Error, Result};

/// Address width for SPI commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Deserialize))]
#[cfg_attr(feature = "std", serde(try_from = "u8"))]
pub enum AddressWidth {
    /// 3-byte (24-bit) address - supports up to 16 MiB
    #[default]
    ThreeByte,
    /// 4-byte (32-bit) address - supports up to 4 GiB
    FourByte,
}

impl AddressWidth {
    /// Returns the number of address bytes
    pub const fn bytes(&self) -> usize {
        match self {
            Self::ThreeByte => 3,
            Self::FourByte => 4,
        }
    }

    /// Returns the first address that can no longer be encoded
    pub const fn limit(&self) -> u64 {
        match self {
            Self::ThreeByte => 1 << 24,
            Self::FourByte => 1 << 32,
        }
    }

    /// Encode an address big-endian into the first `bytes()` bytes of `buf`
    ///
    /// Fails with `BufferTooSmall` if `buf` is shorter than the width.
    pub fn encode(&self, address: u32, buf: &mut [u8]) -> Result<()> {
        let be = address.to_be_bytes();
        let width = self.bytes();
        buf.get_mut(..width)
            .ok_or(Error::BufferTooSmall)?
            .copy_from_slice(&be[4 - width..]);
        Ok(())
    }

    /// Decode a big-endian address from the first `bytes()` bytes of `buf`
    pub fn decode(&self, buf: &[u8]) -> Result<u32> {
        let bytes = buf.get(..self.bytes()).ok_or(Error::BufferTooSmall)?;
        Ok(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
    }
}

impl TryFrom<u8> for AddressWidth {
    type Error = &'static str;

    fn try_from(bytes: u8) -> core::result::Result<Self, Self::Error> {
        match bytes {
            3 => Ok(Self::ThreeByte),
            4 => Ok(Self::FourByte),
            _ => Err("address width must be 3 or 4 bytes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_three_byte() {
        let mut buf = [0u8; 4];
        AddressWidth::ThreeByte.encode(0x12_3456, &mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34, 0x56, 0x00]);
    }

    #[test]
    fn test_encode_four_byte() {
        let mut buf = [0u8; 4];
        AddressWidth::FourByte.encode(0x0123_4567, &mut buf).unwrap();
        assert_eq!(buf, [0x01, 0x23, 0x45, 0x67]);
    }

    #[test]
    fn test_three_byte_drops_high_byte() {
        let mut buf = [0u8; 3];
        AddressWidth::ThreeByte.encode(0xAB12_3456, &mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34, 0x56]);
        assert_eq!(AddressWidth::ThreeByte.decode(&buf), Ok(0x12_3456));
    }

    #[test]
    fn test_short_buffer_is_an_error() {
        let mut buf = [0xEEu8; 3];
        assert_eq!(
            AddressWidth::FourByte.encode(0x0123_4567, &mut buf),
            Err(Error::BufferTooSmall)
        );
        assert_eq!(buf, [0xEE; 3]);
        assert_eq!(AddressWidth::FourByte.decode(&buf), Err(Error::BufferTooSmall));
        assert_eq!(AddressWidth::ThreeByte.decode(&[0x01]), Err(Error::BufferTooSmall));
    }

    #[test]
    fn test_try_from() {
        assert_eq!(AddressWidth::try_from(3), Ok(AddressWidth::ThreeByte));
        assert_eq!(AddressWidth::try_from(4), Ok(AddressWidth::FourByte));
        assert!(AddressWidth::try_from(2).is_err());
    }
}
