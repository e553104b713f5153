//! Status register (Read Status, 0x70)

use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Status register bits
    ///
    /// | Bit | Meaning                          |
    /// | --- | -------------------------------- |
    /// | 0   | Pass (0) / Fail (1)              |
    /// | 6   | Busy (0) / Ready (1)             |
    /// | 7   | Protected (0) / Not protected (1)|
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusRegister: u8 {
        /// Last program or erase failed
        const FAIL = 0x01;
        /// Device ready
        const READY = 0x40;
        /// Write protect not asserted
        const NOT_PROTECTED = 0x80;
    }
}

impl StatusRegister {
    /// Decode a raw status byte, keeping unknown bits
    pub const fn from_raw(raw: u8) -> Self {
        Self::from_bits_retain(raw)
    }

    /// Whether the last program or erase failed
    pub const fn failed(&self) -> bool {
        self.contains(Self::FAIL)
    }

    /// Whether the device is ready
    pub const fn is_ready(&self) -> bool {
        self.contains(Self::READY)
    }

    /// Whether the device is write protected
    pub const fn is_write_protected(&self) -> bool {
        !self.contains(Self::NOT_PROTECTED)
    }
}

impl fmt::Display for StatusRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:02X} ({}, {}, {})",
            self.bits(),
            if self.failed() { "fail" } else { "pass" },
            if self.is_ready() { "ready" } else { "busy" },
            if self.is_write_protected() {
                "protected"
            } else {
                "not protected"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let status = StatusRegister::from_raw(0xE0);
        assert!(!status.failed());
        assert!(status.is_ready());
        assert!(!status.is_write_protected());

        let status = StatusRegister::from_raw(0x41);
        assert!(status.failed());
        assert!(status.is_write_protected());
        assert_eq!(status.bits(), 0x41);
    }
}
