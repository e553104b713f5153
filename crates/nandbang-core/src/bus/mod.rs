//! Control and data bus state
//!
//! The two buses hold the logical pin values in memory and push them to
//! their [`BitbangPort`](crate::port::BitbangPort) only on an explicit
//! flush. Pin changes the NAND device must observe as edges are therefore
//! always a `set_pin` followed by a `flush`.

mod control;
mod data;
mod pins;
mod state;

pub use control::ControlBus;
pub use data::{DataBus, Direction};
pub use pins::{ControlPins, Level, Pin};
pub use state::BusState;
