//! Bus controller abstraction
//!
//! This module defines the transaction primitive the protocol driver needs
//! from the SPI controller it is attached to.

mod traits;

pub use traits::*;
