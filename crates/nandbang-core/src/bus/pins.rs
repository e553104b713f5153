//! Control bus pin assignment
//!
//! | Bit | Signal | Direction | Description                     |
//! | --- | ------ | --------- | ------------------------------- |
//! | 0   | CLE    | out       | Command Latch Enable            |
//! | 1   | ALE    | out       | Address Latch Enable            |
//! | 2   | nCE    | out       | Chip Enable (active low)        |
//! | 3   | nWE    | out       | Write Enable (active low)       |
//! | 4   | nRE    | out       | Read Enable (active low)        |
//! | 5   | nWP    | out       | Write Protect (active low)      |
//! | 6   | RDY    | in        | Ready / nBusy                   |
//! | 7   | LED    | out       | Auxiliary activity indicator    |

use bitflags::bitflags;

bitflags! {
    /// Raw control bus byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControlPins: u8 {
        /// Command Latch Enable
        const CLE = 0x01;
        /// Address Latch Enable
        const ALE = 0x02;
        /// Chip Enable (active low)
        const NCE = 0x04;
        /// Write Enable (active low)
        const NWE = 0x08;
        /// Read Enable (active low)
        const NRE = 0x10;
        /// Write Protect (active low)
        const NWP = 0x20;
        /// Ready / nBusy, driven by the device
        const RDY = 0x40;
        /// Auxiliary indicator
        const LED = 0x80;

        /// Pins driven by the host (everything but RDY)
        const OUTPUTS = !Self::RDY.bits();
    }
}

/// A single named control signal
///
/// Active-low signals keep their `n` prefix but are set and cleared like
/// any other bit: `set_pin(Pin::NCe, false)` drives nCE low, which selects
/// the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    /// Command Latch Enable
    Cle,
    /// Address Latch Enable
    Ale,
    /// Chip Enable (active low)
    NCe,
    /// Write Enable (active low)
    NWe,
    /// Read Enable (active low)
    NRe,
    /// Write Protect (active low)
    NWp,
    /// Ready / nBusy input
    Rdy,
    /// Auxiliary indicator
    Led,
}

impl Pin {
    /// All control pins in bit order
    pub const ALL: [Pin; 8] = [
        Pin::Cle,
        Pin::Ale,
        Pin::NCe,
        Pin::NWe,
        Pin::NRe,
        Pin::NWp,
        Pin::Rdy,
        Pin::Led,
    ];

    /// Bit of this pin within the control byte
    pub const fn mask(&self) -> ControlPins {
        match self {
            Pin::Cle => ControlPins::CLE,
            Pin::Ale => ControlPins::ALE,
            Pin::NCe => ControlPins::NCE,
            Pin::NWe => ControlPins::NWE,
            Pin::NRe => ControlPins::NRE,
            Pin::NWp => ControlPins::NWP,
            Pin::Rdy => ControlPins::RDY,
            Pin::Led => ControlPins::LED,
        }
    }

    /// Datasheet name of the signal
    pub const fn name(&self) -> &'static str {
        match self {
            Pin::Cle => "CLE",
            Pin::Ale => "ALE",
            Pin::NCe => "nCE",
            Pin::NWe => "nWE",
            Pin::NRe => "nRE",
            Pin::NWp => "nWP",
            Pin::Rdy => "RDY",
            Pin::Led => "LED",
        }
    }

    /// Whether the host drives this pin
    pub const fn is_output(&self) -> bool {
        !matches!(self, Pin::Rdy)
    }
}

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Bit cleared
    Low,
    /// Bit set
    High,
}

impl Level {
    /// Level corresponding to a bit value
    pub const fn from_bit(set: bool) -> Self {
        if set {
            Level::High
        } else {
            Level::Low
        }
    }
}
