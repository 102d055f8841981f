//! Flash filesystem library boundary
//!
//! The filesystem itself (wear leveling, object metadata, garbage
//! collection, caching) is an external collaborator. This module only
//! describes the surface it is consumed through: mounting it over a
//! [`FlashHal`](crate::flash::FlashHal) with caller-owned buffers, and its
//! file object API with its own flag and error vocabularies.

mod error;
mod traits;
mod types;

pub use error::FsError;
pub use traits::FlashFs;
pub use types::*;
