//! Control bus

use super::{ControlPins, Level, Pin};
use crate::error::Result;
use crate::port::BitbangPort;

/// Control signal bus (CLE, ALE, nCE, nWE, nRE, nWP, RDY, LED)
///
/// `set_pin` only changes the held byte. Nothing reaches the device until
/// [`flush`](Self::flush) writes the whole byte to the port.
pub struct ControlBus<P> {
    port: P,
    pins: ControlPins,
}

impl<P: BitbangPort> ControlBus<P> {
    /// Wrap a port; all pins start cleared
    pub fn new(port: P) -> Self {
        Self {
            port,
            pins: ControlPins::empty(),
        }
    }

    /// Configure the port so every pin but RDY is driven
    pub fn configure(&mut self) -> Result<()> {
        log::debug!(
            "control bus: output mask 0x{:02X}",
            ControlPins::OUTPUTS.bits()
        );
        self.port.set_direction(ControlPins::OUTPUTS.bits())
    }

    /// Clear every held pin (not flushed)
    pub fn reset_value(&mut self) {
        self.pins = ControlPins::empty();
    }

    /// Set or clear one pin in the held byte (not flushed)
    pub fn set_pin(&mut self, pin: Pin, on: bool) {
        self.pins.set(pin.mask(), on);
    }

    /// Whether `pin` is set in the held byte
    pub fn is_set(&self, pin: Pin) -> bool {
        self.pins.contains(pin.mask())
    }

    /// Held level of `pin`
    pub fn level(&self, pin: Pin) -> Level {
        Level::from_bit(self.is_set(pin))
    }

    /// Held control byte
    pub fn pins(&self) -> ControlPins {
        self.pins
    }

    /// Write the held byte to the port
    pub fn flush(&mut self) -> Result<()> {
        self.port.write_byte(self.pins.bits())
    }

    /// Set or clear `pin` and flush it immediately
    pub fn drive(&mut self, pin: Pin, on: bool) -> Result<()> {
        self.set_pin(pin, on);
        self.flush()
    }

    /// Sample the live control pin levels (RDY included)
    ///
    /// The held byte is not modified.
    pub fn read_status(&mut self) -> Result<ControlPins> {
        let raw = self.port.read_byte()?;
        Ok(ControlPins::from_bits_retain(raw))
    }

    /// Delay for the specified number of microseconds
    pub fn delay_us(&mut self, us: u32) {
        if us > 0 {
            self.port.delay_us(us);
        }
    }

    /// Access the underlying port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::mock::{MockPort, PortOp};

    #[test]
    fn test_set_pin_does_not_touch_port() {
        let port = MockPort::new();
        let mut bus = ControlBus::new(port.clone());
        bus.set_pin(Pin::Cle, true);
        bus.set_pin(Pin::NRe, true);
        assert!(port.ops().is_empty());
        assert_eq!(bus.pins().bits(), 0x11);

        bus.flush().unwrap();
        assert_eq!(port.ops(), [PortOp::Write(0x11)]);
    }

    #[test]
    fn test_clear_pin() {
        let mut bus = ControlBus::new(MockPort::new());
        bus.set_pin(Pin::NCe, true);
        bus.set_pin(Pin::NWp, true);
        bus.set_pin(Pin::NCe, false);
        assert_eq!(bus.pins(), ControlPins::NWP);
        assert_eq!(bus.level(Pin::NCe), Level::Low);
    }

    #[test]
    fn test_read_status_keeps_held_value() {
        let port = MockPort::new();
        port.push_reads(&[0x40]);
        let mut bus = ControlBus::new(port.clone());
        bus.set_pin(Pin::NRe, true);

        let live = bus.read_status().unwrap();
        assert!(live.contains(ControlPins::RDY));
        assert_eq!(bus.pins(), ControlPins::NRE);
    }
}
