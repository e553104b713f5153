//! Data (I/O) bus

use crate::error::{Error, Result};
use crate::port::BitbangPort;

/// Direction of the data bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Driven by the host
    Output,
    /// Released; sampled from the device
    Input,
}

impl Direction {
    /// Port direction mask for this direction
    pub const fn mask(&self) -> u8 {
        match self {
            Direction::Output => 0xFF,
            Direction::Input => 0x00,
        }
    }

    /// Human readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Direction::Output => "output",
            Direction::Input => "input",
        }
    }
}

/// 8-bit I/O bus (IO0..IO7)
pub struct DataBus<P> {
    port: P,
    value: u8,
    direction: Direction,
}

impl<P: BitbangPort> DataBus<P> {
    /// Wrap a port; the bus starts driven with value 0x00
    pub fn new(port: P) -> Self {
        Self {
            port,
            value: 0x00,
            direction: Direction::Output,
        }
    }

    /// Switch between driving the bus and sampling it
    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        self.port.set_direction(direction.mask())?;
        self.direction = direction;
        Ok(())
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Held output value
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Clear the held value (not flushed)
    pub fn reset_value(&mut self) {
        self.value = 0x00;
    }

    /// Set the held value and drive it onto the bus
    pub fn write(&mut self, value: u8) -> Result<()> {
        if self.direction != Direction::Output {
            return Err(Error::DataBusDirection {
                required: Direction::Output,
            });
        }
        self.value = value;
        self.port.write_byte(value)
    }

    /// Drive the held value onto the bus again
    pub fn flush(&mut self) -> Result<()> {
        self.write(self.value)
    }

    /// Sample the bus; only valid while the direction is input
    pub fn read(&mut self) -> Result<u8> {
        if self.direction != Direction::Input {
            return Err(Error::DataBusDirection {
                required: Direction::Input,
            });
        }
        self.port.read_byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::mock::{MockPort, PortOp};

    #[test]
    fn test_write_flushes() {
        let port = MockPort::new();
        let mut bus = DataBus::new(port.clone());
        bus.write(0xA5).unwrap();
        assert_eq!(bus.value(), 0xA5);
        assert_eq!(port.ops(), [PortOp::Write(0xA5)]);
    }

    #[test]
    fn test_direction_switch() {
        let port = MockPort::new();
        port.push_reads(&[0x42]);
        let mut bus = DataBus::new(port.clone());

        assert!(matches!(
            bus.read(),
            Err(Error::DataBusDirection {
                required: Direction::Input
            })
        ));

        bus.set_direction(Direction::Input).unwrap();
        assert_eq!(bus.read().unwrap(), 0x42);
        assert!(bus.write(0x00).is_err());

        bus.set_direction(Direction::Output).unwrap();
        assert_eq!(
            port.ops(),
            [
                PortOp::Direction(0x00),
                PortOp::Read,
                PortOp::Direction(0xFF)
            ]
        );
    }
}
