//! SPI types and command structures
//!
//! This module provides the address encoding, the bus command byte
//! sequence, and the standard JEDEC opcodes used by the protocol driver.

mod address;
mod command;
pub mod opcodes;

pub use address::AddressWidth;
pub use command::{BusCommand, EncodedCommand, MAX_HEADER_LEN};
pub use opcodes::*;
