//! TOML profile file parsing
//!
//! Every key is optional and falls back to the built-in H27U4G8F2D values:
//!
//! ```toml
//! [chip]
//! name = "H27U4G8F2D"
//! id = "AD DC 10 95 54"
//!
//! [geometry]
//! data_bytes = 2048
//! spare_bytes = 64
//! pages_per_block = 64
//! blocks = 4096
//! page_stride = 0x1000
//!
//! [timing]
//! address_setup_us = 10
//! read_access_us = 10
//! ```

use std::format;
use std::fs;
use std::path::Path;
use std::string::String;

use super::{NandProfile, ProfileError};
use crate::nand::DeviceId;
use crate::timing::TimingProfile;

/// TOML profile file structure
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlProfileFile {
    chip: Option<TomlChip>,
    geometry: Option<TomlGeometry>,
    timing: Option<TimingProfile>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlChip {
    name: Option<String>,
    id: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlGeometry {
    #[serde(default, deserialize_with = "deserialize_hex_u32")]
    data_bytes: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_hex_u32")]
    spare_bytes: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_hex_u32")]
    pages_per_block: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_hex_u32")]
    blocks: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_hex_u32")]
    page_stride: Option<u32>,
}

/// Deserialize a u32 that can be hex (0x...) or decimal
fn deserialize_hex_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(u32),
        Str(String),
    }

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(Some(n)),
        HexOrInt::Str(s) => parse_number(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parse a number that can be hex (0x...) or decimal
fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

impl NandProfile {
    /// Load a profile from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a profile from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        let file: TomlProfileFile = toml::from_str(content)?;
        let mut profile = NandProfile::default();

        if let Some(chip) = file.chip {
            if let Some(name) = chip.name {
                profile.name = name;
            }
            if let Some(id) = chip.id {
                profile.id = DeviceId::parse_hex(&id).ok_or_else(|| ProfileError::InvalidId(id))?;
            }
        }

        if let Some(geometry) = file.geometry {
            let g = &mut profile.geometry;
            g.data_bytes = geometry.data_bytes.unwrap_or(g.data_bytes);
            g.spare_bytes = geometry.spare_bytes.unwrap_or(g.spare_bytes);
            g.pages_per_block = geometry.pages_per_block.unwrap_or(g.pages_per_block);
            g.blocks = geometry.blocks.unwrap_or(g.blocks);
            g.page_stride = geometry.page_stride.unwrap_or(g.page_stride);
        }

        if let Some(timing) = file.timing {
            profile.timing = timing;
        }

        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(
            NandProfile::from_toml_str("").unwrap(),
            NandProfile::default()
        );
    }

    #[test]
    fn test_override_fields() {
        let profile = NandProfile::from_toml_str(
            r#"
            [chip]
            name = "MT29F4G08"
            id = "2C DC 90 95 56"

            [geometry]
            blocks = 2048
            page_stride = "0x1000"

            [timing]
            read_access_us = 2
            "#,
        )
        .unwrap();
        assert_eq!(profile.name, "MT29F4G08");
        assert_eq!(profile.id, DeviceId([0x2C, 0xDC, 0x90, 0x95, 0x56]));
        assert_eq!(profile.geometry.blocks, 2048);
        assert_eq!(profile.geometry.data_bytes, 2048);
        assert_eq!(profile.timing.read_access_us, 2);
        // Unlisted timing keys fall back to the conservative table
        assert_eq!(profile.timing.address_setup_us, 10);
    }

    #[test]
    fn test_bad_id() {
        assert!(matches!(
            NandProfile::from_toml_str("[chip]\nid = \"ADDC\"\n"),
            Err(ProfileError::InvalidId(_))
        ));
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            NandProfile::from_toml_str("[geometry]\nplanes = 2\n"),
            Err(ProfileError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_timing_key() {
        assert!(matches!(
            NandProfile::from_toml_str("[timing]\nread_acces_us = 2\n"),
            Err(ProfileError::Parse(_))
        ));
    }
}
