//! Port trait definitions
//!
//! A [`BitbangPort`] is one 8-bit GPIO channel of an adapter. The NAND
//! session uses two of them: one for the I/O bus and one for the control
//! signals. Adapters open and configure their channels themselves; closing
//! happens when the port is dropped.

use crate::error::Result;

/// Byte-wide bitbang GPIO channel
///
/// Every call is a blocking round-trip to the adapter. The protocol engine
/// relies on calls reaching the pins in the order they are issued, since
/// the NAND device treats control writes as clock edges.
///
/// ## Example: adapter implementation
///
/// ```ignore
/// impl BitbangPort for MyAdapterChannel {
///     fn set_direction(&mut self, output_mask: u8) -> Result<()> {
///         self.configure_bitmode(output_mask).map_err(|_| Error::PortError)
///     }
///
///     fn write_byte(&mut self, value: u8) -> Result<()> {
///         self.send(&[value]).map_err(|_| Error::PortError)
///     }
///
///     fn read_byte(&mut self) -> Result<u8> {
///         self.sample_pins().map_err(|_| Error::PortError)
///     }
///
///     fn delay_us(&mut self, us: u32) {
///         std::thread::sleep(Duration::from_micros(us as u64));
///     }
/// }
/// ```
pub trait BitbangPort {
    /// Select which pins are driven
    ///
    /// Bits set in `output_mask` become outputs, cleared bits become inputs
    /// (released so the device may drive them).
    fn set_direction(&mut self, output_mask: u8) -> Result<()>;

    /// Drive `value` onto the output pins
    fn write_byte(&mut self, value: u8) -> Result<()>;

    /// Sample the live level of all 8 pins
    fn read_byte(&mut self) -> Result<u8>;

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}

// Blanket impl for boxed ports to allow trait objects (e.g. CLI dispatch)
#[cfg(feature = "alloc")]
impl BitbangPort for alloc::boxed::Box<dyn BitbangPort> {
    fn set_direction(&mut self, output_mask: u8) -> Result<()> {
        (**self).set_direction(output_mask)
    }

    fn write_byte(&mut self, value: u8) -> Result<()> {
        (**self).write_byte(value)
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Information about a programmer
#[derive(Debug, Clone)]
pub struct ProgrammerInfo {
    /// Name of the programmer
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description
    pub description: &'static str,
}
