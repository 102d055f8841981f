//! Error types for spiflash-fs-core
//!
//! This module provides the no_std compatible error type returned by the
//! bus, protocol and driver layers.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bus errors
    /// The bus controller reported a failed transaction
    BusFault,
    /// Opcode is not understood by the device behind the bus
    OpcodeNotSupported,

    // Chip errors
    /// The busy bit never cleared within the poll budget
    DeviceUnresponsive,
    /// A destructive command was issued without the write enable latch set
    WriteProtected,

    // Address/size errors
    /// Address range is outside the configured flash region
    AddressOutOfBounds,
    /// Operation requires an aligned address
    InvalidAlignment,
    /// Provided buffer is too small for the operation
    BufferTooSmall,

    // Configuration errors
    /// Flash geometry or opcode configuration is inconsistent
    InvalidConfig,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFault => write!(f, "SPI bus transaction failed"),
            Self::OpcodeNotSupported => write!(f, "SPI opcode not supported by device"),
            Self::DeviceUnresponsive => write!(f, "flash device did not become ready"),
            Self::WriteProtected => write!(f, "write enable latch not set"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::InvalidAlignment => write!(f, "invalid alignment"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::InvalidConfig => write!(f, "invalid flash configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
