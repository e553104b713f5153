//! Bus self-test
//!
//! Walks every driven pin so the wiring can be checked with a logic analyser
//! or LEDs, then releases both buses and samples what the pins read back.

use super::ProtocolEngine;
use crate::bus::{ControlPins, Direction, Pin};
use crate::error::Result;
use crate::port::BitbangPort;

/// Data bus patterns driven after the bit walk
pub const DATA_PATTERNS: [u8; 4] = [0xFF, 0xAA, 0x55, 0x00];

/// One step of the self-test, reported before it is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTestStep {
    /// A control pin was switched
    ControlPin {
        /// Pin that changed
        pin: Pin,
        /// New state
        on: bool,
    },
    /// A data bus bit was switched
    DataBit {
        /// Bit index (IO0..IO7)
        bit: u8,
        /// New state
        on: bool,
    },
    /// A full byte was driven onto the data bus
    DataPattern(u8),
}

/// Pin levels sampled with both buses released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSample {
    /// Data bus input value
    pub data: u8,
    /// Control bus input value
    pub control: ControlPins,
}

impl<D: BitbangPort, C: BitbangPort> ProtocolEngine<D, C> {
    /// Switch every driven control pin on in bit order, then off again
    pub fn walk_control_pins(
        &mut self,
        step_us: u32,
        on_step: &mut dyn FnMut(SelfTestStep),
    ) -> Result<()> {
        for on in [true, false] {
            for pin in Pin::ALL.into_iter().filter(Pin::is_output) {
                on_step(SelfTestStep::ControlPin { pin, on });
                self.control.drive(pin, on)?;
                self.control.delay_us(step_us);
            }
        }
        Ok(())
    }

    /// Switch every data bit on from IO0 to IO7, then off again, followed
    /// by the fixed patterns and finally every even bit
    pub fn walk_data_bus(
        &mut self,
        step_us: u32,
        on_step: &mut dyn FnMut(SelfTestStep),
    ) -> Result<()> {
        self.data.set_direction(Direction::Output)?;
        let mut value = self.data.value();
        for on in [true, false] {
            for bit in 0..8u8 {
                on_step(SelfTestStep::DataBit { bit, on });
                if on {
                    value |= 1 << bit;
                } else {
                    value &= !(1 << bit);
                }
                self.data.write(value)?;
                self.control.delay_us(step_us);
            }
        }
        for pattern in DATA_PATTERNS.into_iter().chain([0x55]) {
            on_step(SelfTestStep::DataPattern(pattern));
            self.data.write(pattern)?;
            self.control.delay_us(step_us);
        }
        Ok(())
    }

    /// Release both buses, sample them and drive them again
    ///
    /// The held control byte is not modified.
    pub fn sample_inputs(&mut self) -> Result<BusSample> {
        self.data.set_direction(Direction::Input)?;
        let data = self.data.read();
        let data_restore = self.data.set_direction(Direction::Output);

        self.control.port_mut().set_direction(0x00)?;
        let control = self.control.read_status();
        let control_restore = self.control.configure();

        let sample = BusSample {
            data: data?,
            control: control?,
        };
        data_restore?;
        control_restore?;
        log::debug!(
            "input sample: data 0x{:02X}, control 0x{:02X}",
            sample.data,
            sample.control.bits()
        );
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::mock::{MockPort, PortOp};
    use crate::timing::TimingProfile;
    use std::vec::Vec;

    #[test]
    fn test_control_walk_skips_rdy() {
        let control = MockPort::new();
        let mut engine =
            ProtocolEngine::new(MockPort::new(), control.clone(), TimingProfile::none());
        let mut steps = Vec::new();
        engine
            .walk_control_pins(0, &mut |step| steps.push(step))
            .unwrap();

        assert_eq!(steps.len(), 14);
        assert_eq!(
            control.writes(),
            [
                0x01, 0x03, 0x07, 0x0F, 0x1F, 0x3F, 0xBF, 0xBE, 0xBC, 0xB8, 0xB0, 0xA0, 0x80,
                0x00
            ]
        );
    }

    #[test]
    fn test_data_walk_ends_on_even_bits() {
        let data = MockPort::new();
        let mut engine =
            ProtocolEngine::new(data.clone(), MockPort::new(), TimingProfile::none());
        engine.walk_data_bus(0, &mut |_| {}).unwrap();

        let writes = data.writes();
        assert_eq!(writes.len(), 16 + 5);
        assert_eq!(writes[7], 0xFF);
        assert_eq!(writes[15], 0x00);
        assert_eq!(&writes[16..], &[0xFF, 0xAA, 0x55, 0x00, 0x55]);
    }

    #[test]
    fn test_sample_inputs_restores_directions() {
        let data = MockPort::new();
        let control = MockPort::new();
        data.push_reads(&[0x5A]);
        control.push_reads(&[0x40]);
        let mut engine = ProtocolEngine::new(data.clone(), control.clone(), TimingProfile::none());

        let sample = engine.sample_inputs().unwrap();
        assert_eq!(sample.data, 0x5A);
        assert_eq!(sample.control, ControlPins::RDY);
        assert_eq!(
            data.ops(),
            [
                PortOp::Direction(0x00),
                PortOp::Read,
                PortOp::Direction(0xFF)
            ]
        );
        assert_eq!(
            control.ops(),
            [
                PortOp::Direction(0x00),
                PortOp::Read,
                PortOp::Direction(0xBF)
            ]
        );
    }
}
