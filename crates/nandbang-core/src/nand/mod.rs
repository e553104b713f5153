//! NAND flash device operations
//!
//! This module composes the protocol engine primitives into the device
//! level operations: read ID, read page, read status and block erase.

mod geometry;
mod id;
mod operations;
mod status;

pub use geometry::Geometry;
pub use id::{manufacturer_name, DeviceId, IdMatch};
pub use operations::{BusyWait, NandConfig, NandFlash};
pub use status::StatusRegister;
