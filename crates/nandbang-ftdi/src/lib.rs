//! nandbang-ftdi - FT2232H bitbang ports
//!
//! This crate exposes the two channels of an FTDI FT2232H as
//! [`BitbangPort`](nandbang_core::port::BitbangPort)s in asynchronous
//! bitbang mode, so a raw NAND device can be wired straight to the
//! adapter's pin headers.
//!
//! # Wiring
//!
//! | FT2232H  | NAND      | Direction |
//! |----------|-----------|-----------|
//! | ADBUS0-7 | IO0-IO7   | in/out    |
//! | BDBUS0   | CLE       | out       |
//! | BDBUS1   | ALE       | out       |
//! | BDBUS2   | nCE       | out       |
//! | BDBUS3   | nWE       | out       |
//! | BDBUS4   | nRE       | out       |
//! | BDBUS5   | nWP       | out       |
//! | BDBUS6   | R/nB      | in        |
//! | BDBUS7   | LED       | out       |
//!
//! R/nB is open drain on the NAND side and needs a pull-up.
//!
//! # Example
//!
//! ```no_run
//! use nandbang_core::nand::{NandConfig, NandFlash};
//! use nandbang_ftdi::{open_pair, FtdiConfig};
//!
//! let (data, control) = open_pair(&FtdiConfig::default())?;
//! let mut flash = NandFlash::open(data, control, NandConfig::default())?;
//! println!("ID: {}", flash.read_id()?.actual());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Programmer Options
//!
//! - `vid=<hex>` - USB vendor ID (default: 0403)
//! - `pid=<hex>` - USB product ID (default: 6010)
//! - `data=<A|B>` - Channel wired to the I/O bus (default: A)
//! - `control=<A|B>` - Channel wired to the control signals (default: B)
//! - `latency=<ms>` - USB latency timer (default: 2)

mod device;
mod error;
mod protocol;

pub use device::{list_devices, open_pair, parse_options, FtdiConfig, FtdiDeviceInfo, FtdiPort};
pub use error::{FtdiError, Result};
pub use protocol::{FtdiInterface, FT2232H_PID, FT2232H_VID};
