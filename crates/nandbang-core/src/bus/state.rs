//! Snapshot of the session's bus state

use super::{ControlPins, Direction};

/// Logical state of both buses as last set by the host
///
/// This is what the host believes it is driving, not a sample of the pins.
/// Use [`ControlBus::read_status`](super::ControlBus::read_status) to sample
/// the live control pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusState {
    /// Held control bus byte
    pub control: ControlPins,
    /// Held data bus byte
    pub data: u8,
    /// Current data bus direction
    pub direction: Direction,
}

impl BusState {
    /// State at session start: all pins cleared, data bus driven
    pub const INITIAL: BusState = BusState {
        control: ControlPins::empty(),
        data: 0x00,
        direction: Direction::Output,
    };
}

impl Default for BusState {
    fn default() -> Self {
        Self::INITIAL
    }
}
