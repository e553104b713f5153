//! GPIO port traits and abstractions
//!
//! This module defines the byte-wide port trait a GPIO adapter must
//! implement so the protocol engine can drive a bus through it.

mod traits;

pub use traits::*;

#[cfg(test)]
pub(crate) mod mock;
