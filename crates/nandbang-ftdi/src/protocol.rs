//! FT2232H constants

/// FTDI vendor ID
pub const FT2232H_VID: u16 = 0x0403;
/// FT2232H product ID
pub const FT2232H_PID: u16 = 0x6010;

/// Default USB latency timer in milliseconds
pub const DEFAULT_LATENCY_MS: u8 = 2;

/// Bitbang output mask with every pin driven
pub const MASK_ALL_OUTPUT: u8 = 0xFF;

/// FT2232H channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FtdiInterface {
    /// Channel A (ADBUS)
    A,
    /// Channel B (BDBUS)
    B,
}

impl FtdiInterface {
    /// Parse a channel letter (case insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(FtdiInterface::A),
            'B' => Some(FtdiInterface::B),
            _ => None,
        }
    }

    /// Channel letter
    pub fn letter(&self) -> char {
        match self {
            FtdiInterface::A => 'A',
            FtdiInterface::B => 'B',
        }
    }

    /// libftdi interface selector
    pub(crate) fn to_ftdi(self) -> ftdi::Interface {
        match self {
            FtdiInterface::A => ftdi::Interface::A,
            FtdiInterface::B => ftdi::Interface::B,
        }
    }
}

impl std::fmt::Display for FtdiInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}
