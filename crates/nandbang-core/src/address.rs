//! Address cycle mapping for x8 devices
//!
//! A linear memory address is sent to the device as five Address Input
//! cycles. The first two carry the column (byte offset inside the page),
//! the last three carry the row (page and block index):
//!
//! |              | IO7  | IO6  | IO5  | IO4  | IO3  | IO2  | IO1  | IO0  |
//! | ------------ | ---- | ---- | ---- | ---- | ---- | ---- | ---- | ---- |
//! | First Cycle  | A7   | A6   | A5   | A4   | A3   | A2   | A1   | A0   |
//! | Second Cycle | -    | -    | -    | -    | A11  | A10  | A9   | A8   |
//! | Third Cycle  | A19  | A18  | A17  | A16  | A15  | A14  | A13  | A12  |
//! | Fourth Cycle | A27  | A26  | A25  | A24  | A23  | A22  | A21  | A20  |
//! | Fifth Cycle  | -    | -    | -    | -    | -    | -    | A29  | A28  |
//!
//! Block erase only sends the three row cycles.

/// Number of address cycles for a full (column + row) address
pub const ADDRESS_CYCLES: usize = 5;

/// Number of linear address bits used by the column field
pub const COLUMN_BITS: u32 = 12;

/// Five address cycles for one linear address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AddressCycles([u8; ADDRESS_CYCLES]);

impl AddressCycles {
    /// Map a linear address to its address cycles
    pub const fn from_linear(address: u32) -> Self {
        AddressCycles([
            (address & 0xFF) as u8,
            ((address >> 8) & 0x0F) as u8,
            ((address >> 12) & 0xFF) as u8,
            ((address >> 20) & 0xFF) as u8,
            ((address >> 28) & 0x03) as u8,
        ])
    }

    /// Build from raw cycle bytes
    pub const fn from_bytes(cycles: [u8; ADDRESS_CYCLES]) -> Self {
        AddressCycles(cycles)
    }

    /// All five cycles, in transmission order
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_CYCLES] {
        &self.0
    }

    /// Column cycles (first and second)
    pub fn column(&self) -> &[u8] {
        &self.0[..2]
    }

    /// Row cycles (third to fifth)
    pub fn row(&self) -> &[u8] {
        &self.0[2..]
    }

    /// Decoded column address
    pub const fn column_address(&self) -> u16 {
        self.0[0] as u16 | ((self.0[1] as u16) << 8)
    }

    /// Decoded row address
    pub const fn row_address(&self) -> u32 {
        self.0[2] as u32 | ((self.0[3] as u32) << 8) | ((self.0[4] as u32) << 16)
    }
}

impl core::fmt::Display for AddressCycles {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [c0, c1, r0, r1, r2] = self.0;
        write!(
            f,
            "0x{:02X} 0x{:02X} | 0x{:02X} 0x{:02X} 0x{:02X}",
            c0, c1, r0, r1, r2
        )
    }
}

/// Map a linear address to its five address cycles
pub const fn map_address(address: u32) -> AddressCycles {
    AddressCycles::from_linear(address)
}
