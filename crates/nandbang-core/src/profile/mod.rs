//! NAND device profiles
//!
//! A profile bundles everything that differs from one NAND part to the
//! next: the expected ID signature, the array geometry and the bus delays.
//! The built-in profile describes the Hynix H27U4G8F2D; other parts are
//! described in TOML files (see [`toml`]).

mod toml;

use std::string::String;

use crate::nand::{BusyWait, DeviceId, Geometry, NandConfig};
use crate::timing::TimingProfile;

/// Errors while loading a profile
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Profile file could not be read
    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),
    /// Profile file is not valid TOML for a profile
    #[error("failed to parse profile: {0}")]
    Parse(#[from] ::toml::de::Error),
    /// ID string is not ten hex digits
    #[error("invalid device ID: {0}")]
    InvalidId(String),
    /// Geometry is unusable
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),
}

/// Highest linear address the five address cycles can carry
pub const ADDRESS_SPACE: u64 = 1 << 30;

/// Description of one NAND part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NandProfile {
    /// Part name
    pub name: String,
    /// Expected Read ID signature
    pub id: DeviceId,
    /// Array organisation
    pub geometry: Geometry,
    /// Bus delays
    pub timing: TimingProfile,
}

impl Default for NandProfile {
    fn default() -> Self {
        Self {
            name: String::from("H27U4G8F2D"),
            id: DeviceId::H27U4G8F2D,
            geometry: Geometry::H27U4G8F2D,
            timing: TimingProfile::conservative(),
        }
    }
}

impl NandProfile {
    /// Check that the geometry can be addressed
    pub fn validate(&self) -> Result<(), ProfileError> {
        let g = &self.geometry;
        if g.data_bytes == 0 {
            return Err(ProfileError::InvalidGeometry("data_bytes must not be 0"));
        }
        if g.pages_per_block == 0 || g.blocks == 0 {
            return Err(ProfileError::InvalidGeometry(
                "pages_per_block and blocks must not be 0",
            ));
        }
        if (g.page_stride as usize) < g.page_bytes() {
            return Err(ProfileError::InvalidGeometry(
                "page_stride is smaller than a page",
            ));
        }
        let span = g.page_stride as u64 * g.pages_per_block as u64 * g.blocks as u64;
        if span > ADDRESS_SPACE {
            return Err(ProfileError::InvalidGeometry(
                "array does not fit in five address cycles",
            ));
        }
        Ok(())
    }

    /// Session configuration for this part
    pub fn config(&self, busy_wait: BusyWait, reset_on_open: bool) -> NandConfig {
        NandConfig {
            expected_id: self.id,
            geometry: self.geometry,
            timing: self.timing,
            busy_wait,
            reset_on_open,
        }
    }
}
