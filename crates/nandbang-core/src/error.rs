//! Error types for nandbang-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

use crate::bus::{Direction, Level, Pin};

/// The bus operation whose precondition was checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchOp {
    /// Command Input bus operation
    Command,
    /// Address Input bus operation
    Address,
    /// Data Output bus operation
    DataOut,
}

impl LatchOp {
    /// Human readable name of the bus operation
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Command => "command input",
            Self::Address => "address input",
            Self::DataOut => "data output",
        }
    }
}

/// A control pin was not at the level a bus operation requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precondition {
    /// Operation that refused to run
    pub op: LatchOp,
    /// Offending pin
    pub pin: Pin,
    /// Level the datasheet requires for `pin`
    pub required: Level,
}

/// Details about an erase failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseFailure {
    /// Block that was being erased
    pub block: u32,
    /// Raw status register value read after the erase
    pub status: u8,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Protocol errors
    /// A latch primitive was invoked with the control bus in the wrong state
    PreconditionViolation(Precondition),
    /// Address Input needs between 1 and 5 cycles
    InvalidAddressLength(usize),
    /// The data bus was in the wrong direction for the requested access
    DataBusDirection {
        /// Direction the access needed
        required: Direction,
    },
    /// The bounded busy-wait gave up before R/B went high
    Timeout {
        /// Number of status polls performed
        polls: u32,
    },

    // Device errors
    /// Block erase reported failure in the status register
    EraseError(EraseFailure),
    /// Operation is not implemented for raw NAND
    Unsupported,

    // Address/size errors
    /// Page or block is beyond the device geometry
    AddressOutOfBounds,
    /// Provided buffer does not match the page size
    BufferTooSmall,

    // Transport errors
    /// The underlying GPIO port failed
    PortError,
    /// I/O error on the dump sink
    IoError,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requires {} pin to be {}",
            self.op.name(),
            self.pin.name(),
            self.required
        )
    }
}

impl fmt::Display for EraseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "erase of block {} failed (status 0x{:02X})",
            self.block, self.status
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreconditionViolation(p) => write!(f, "precondition violated: {}", p),
            Self::InvalidAddressLength(n) => {
                write!(f, "invalid address length {} (expected 1..=5 cycles)", n)
            }
            Self::DataBusDirection { required } => {
                write!(f, "data bus must be {} for this access", required.name())
            }
            Self::Timeout { polls } => {
                write!(f, "device still busy after {} status polls", polls)
            }
            Self::EraseError(failure) => write!(f, "{}", failure),
            Self::Unsupported => write!(f, "operation not supported"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::BufferTooSmall => write!(f, "buffer does not match page size"),
            Self::PortError => write!(f, "GPIO port error"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
