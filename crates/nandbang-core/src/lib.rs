//! nandbang-core - Bit-banged raw NAND flash protocol engine
//!
//! This crate drives a raw x8 NAND flash device through two independent
//! 8-bit GPIO ports: one carrying the I/O (data) bus and one carrying the
//! control signals (CLE, ALE, nCE, nWE, nRE, nWP, R/B). Every bus cycle of
//! the datasheet (Command Input, Address Input, Data Output) is reproduced
//! with discrete pin toggles. It is designed to be `no_std` compatible; the
//! only thing it needs from the outside world is an implementation of
//! [`port::BitbangPort`] for each bus.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`), TOML
//!   profiles and the page dump driver
//! - `alloc` - Enable heap allocated page buffers
//!
//! # Example
//!
//! ```ignore
//! use nandbang_core::nand::{NandConfig, NandFlash};
//!
//! let mut flash = NandFlash::open(data_port, control_port, NandConfig::default())?;
//! let id = flash.read_id()?;
//! if id.is_match() {
//!     let page = flash.read_page(0)?;
//!     println!("first byte: 0x{:02X}", page[0]);
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod address;
pub mod bus;
#[cfg(feature = "std")]
pub mod dump;
pub mod error;
pub mod nand;
pub mod port;
#[cfg(feature = "std")]
pub mod profile;
pub mod protocol;
pub mod timing;

pub use error::{Error, Result};
