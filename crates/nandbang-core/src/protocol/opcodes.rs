//! Raw NAND command set
//!
//! Two-cycle commands are listed as a first/confirm pair.

// ============================================================================
// Identification and status
// ============================================================================

/// Read ID
pub const READ_ID: u8 = 0x90;
/// Read Status Register
pub const READ_STATUS: u8 = 0x70;
/// Reset
pub const RESET: u8 = 0xFF;

// ============================================================================
// Array operations
// ============================================================================

/// Page Read, first cycle
pub const READ_1ST: u8 = 0x00;
/// Page Read, confirm cycle
pub const READ_2ND: u8 = 0x30;
/// Block Erase, first cycle
pub const BLOCK_ERASE_1ST: u8 = 0x60;
/// Block Erase, confirm cycle
pub const BLOCK_ERASE_2ND: u8 = 0xD0;
/// Page Program, first cycle
pub const PAGE_PROGRAM_1ST: u8 = 0x80;
/// Page Program, confirm cycle
pub const PAGE_PROGRAM_2ND: u8 = 0x10;

/// Datasheet name of an opcode, for logging
pub const fn name(opcode: u8) -> &'static str {
    match opcode {
        READ_ID => "READ ID",
        READ_STATUS => "READ STATUS",
        RESET => "RESET",
        READ_1ST => "READ (1st)",
        READ_2ND => "READ (2nd)",
        BLOCK_ERASE_1ST => "BLOCK ERASE (1st)",
        BLOCK_ERASE_2ND => "BLOCK ERASE (2nd)",
        PAGE_PROGRAM_1ST => "PAGE PROGRAM (1st)",
        PAGE_PROGRAM_2ND => "PAGE PROGRAM (2nd)",
        _ => "unknown",
    }
}
