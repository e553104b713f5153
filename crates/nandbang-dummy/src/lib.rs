//! nandbang-dummy - Simulated raw NAND device
//!
//! This crate provides a NAND device model that sits behind two
//! [`BitbangPort`]s, so the protocol engine can run against it without any
//! hardware. The model decodes the bus the same way a real part does:
//!
//! - a rising edge of nWE latches a command (CLE high) or an address byte
//!   (ALE high) from the data bus
//! - a falling edge of nRE puts the next output byte on the data bus
//! - R/B goes low for a configurable number of polls after every array
//!   operation
//!
//! Everything the device observes is appended to a [`BusEvent`] trace.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
mod sim;

#[cfg(feature = "alloc")]
pub use sim::{SimControlPort, SimDataPort, SimNand};

use nandbang_core::nand::{DeviceId, Geometry};

/// Initial content of pages that were never erased
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    /// Every byte reads 0xFF
    #[default]
    Erased,
    /// Every page holds [`page_pattern`]
    Pattern,
}

/// Configuration for the simulated device
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Read ID answer
    pub id: DeviceId,
    /// Array organisation
    pub geometry: Geometry,
    /// R/B polls reported busy after every array operation
    pub busy_polls: u32,
    /// Never report ready
    pub stuck_busy: bool,
    /// Report every erase as failed
    pub fail_erase: bool,
    /// Content of pages that were never erased
    pub fill: Fill,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            id: DeviceId::H27U4G8F2D,
            geometry: Geometry::H27U4G8F2D,
            busy_polls: 2,
            stuck_busy: false,
            fail_erase: false,
            fill: Fill::Erased,
        }
    }
}

/// Bus activity observed by the simulated device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// Command latched
    Command(u8),
    /// Address byte latched
    Address(u8),
    /// R/B sampled by the host
    BusyPoll {
        /// Whether the device reported ready
        ready: bool,
    },
    /// Byte presented on a falling edge of nRE
    DataOut(u8),
}

/// Content of `row` byte `column` under [`Fill::Pattern`]
pub fn page_pattern_byte(row: u32, column: usize) -> u8 {
    (column as u8) ^ (row as u8).rotate_left(3) ^ ((column >> 8) as u8)
}

/// Full page (data + spare) of `row` under [`Fill::Pattern`]
#[cfg(feature = "alloc")]
pub fn page_pattern(row: u32, page_bytes: usize) -> alloc::vec::Vec<u8> {
    (0..page_bytes).map(|col| page_pattern_byte(row, col)).collect()
}

/// Parse programmer options
///
/// Format: "busy=<polls>,stuck=<0|1>,fail=<0|1>,id=<hex10>,fill=<erased|pattern>"
#[cfg(feature = "alloc")]
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig, alloc::string::String> {
    use alloc::format;

    let mut config = DummyConfig::default();
    for (key, value) in options {
        match *key {
            "busy" => {
                config.busy_polls = value
                    .parse()
                    .map_err(|_| format!("Invalid busy poll count '{}'", value))?;
            }
            "stuck" => config.stuck_busy = parse_flag(key, value)?,
            "fail" => config.fail_erase = parse_flag(key, value)?,
            "id" => {
                config.id = DeviceId::parse_hex(value)
                    .ok_or_else(|| format!("Invalid ID '{}': expected 10 hex digits", value))?;
            }
            "fill" => {
                config.fill = match *value {
                    "erased" | "ff" => Fill::Erased,
                    "pattern" => Fill::Pattern,
                    _ => {
                        return Err(format!(
                            "Invalid fill '{}': must be erased or pattern",
                            value
                        ))
                    }
                };
            }
            _ => {
                log::warn!("Unknown dummy option: {}={}", key, value);
            }
        }
    }
    Ok(config)
}

#[cfg(feature = "alloc")]
fn parse_flag(key: &str, value: &str) -> Result<bool, alloc::string::String> {
    match value {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(alloc::format!("Invalid value '{}' for {}", value, key)),
    }
}
