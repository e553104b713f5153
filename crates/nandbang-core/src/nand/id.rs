//! Read ID signature

use core::fmt;

/// Number of bytes returned by Read ID
pub const ID_LEN: usize = 5;

/// Five byte Read ID signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub [u8; ID_LEN]);

impl DeviceId {
    /// Hynix H27U4G8F2D (4 Gbit, x8, 2 KiB + 64 B pages)
    pub const H27U4G8F2D: DeviceId = DeviceId([0xAD, 0xDC, 0x10, 0x95, 0x54]);

    /// Manufacturer code (first byte)
    pub const fn manufacturer(&self) -> u8 {
        self.0[0]
    }

    /// Device code (second byte)
    pub const fn device(&self) -> u8 {
        self.0[1]
    }

    /// Raw signature bytes
    pub const fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Page data size in bytes announced by the fourth ID byte
    pub const fn page_size_hint(&self) -> u32 {
        1024 << (self.0[3] & 0x03)
    }

    /// Block size in bytes announced by the fourth ID byte
    pub const fn block_size_hint(&self) -> u32 {
        (64 * 1024) << ((self.0[3] >> 4) & 0x03)
    }

    /// Spare bytes per 512 data bytes announced by the fourth ID byte
    pub const fn spare_per_512_hint(&self) -> u32 {
        8 << ((self.0[3] >> 2) & 0x01)
    }

    /// Parse ten hex digits (`"ADDC109554"`), optionally `0x` prefixed
    /// and with spaces or colons between bytes
    pub fn parse_hex(s: &str) -> Option<DeviceId> {
        let s = s.trim();
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let mut bytes = [0u8; ID_LEN];
        let mut count = 0;
        let mut high: Option<u8> = None;
        for c in s.chars() {
            if c == ' ' || c == ':' {
                continue;
            }
            let nibble = c.to_digit(16)? as u8;
            match high.take() {
                None => high = Some(nibble),
                Some(h) => {
                    if count == ID_LEN {
                        return None;
                    }
                    bytes[count] = (h << 4) | nibble;
                    count += 1;
                }
            }
        }
        if count == ID_LEN && high.is_none() {
            Some(DeviceId(bytes))
        } else {
            None
        }
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::H27U4G8F2D
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// Outcome of comparing a Read ID against the expected signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMatch {
    /// The device answered with the expected signature
    Match(DeviceId),
    /// The device answered with something else
    Mismatch {
        /// Signature the session was configured for
        expected: DeviceId,
        /// Signature read from the device
        actual: DeviceId,
    },
}

impl IdMatch {
    /// Compare `actual` against `expected`
    pub fn compare(expected: DeviceId, actual: DeviceId) -> Self {
        if expected == actual {
            IdMatch::Match(actual)
        } else {
            IdMatch::Mismatch { expected, actual }
        }
    }

    /// Whether the signatures matched
    pub fn is_match(&self) -> bool {
        matches!(self, IdMatch::Match(_))
    }

    /// Signature read from the device
    pub fn actual(&self) -> DeviceId {
        match self {
            IdMatch::Match(id) => *id,
            IdMatch::Mismatch { actual, .. } => *actual,
        }
    }
}

/// Human readable manufacturer name for a JEDEC manufacturer code
pub fn manufacturer_name(code: u8) -> &'static str {
    match code {
        0x01 => "Spansion",
        0x04 => "Fujitsu",
        0x20 => "STMicro",
        0x2C => "Micron",
        0x98 => "Toshiba",
        0xAD => "Hynix",
        0xC2 => "Macronix",
        0xC8 => "GigaDevice",
        0xEC => "Samsung",
        0xEF => "Winbond",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare() {
        let expected = DeviceId::H27U4G8F2D;
        assert!(IdMatch::compare(expected, expected).is_match());

        let actual = DeviceId([0xAD, 0xDC, 0x10, 0x95, 0x55]);
        let result = IdMatch::compare(expected, actual);
        assert!(!result.is_match());
        assert_eq!(result.actual(), actual);
    }

    #[test]
    fn test_geometry_hints() {
        let id = DeviceId::H27U4G8F2D;
        assert_eq!(manufacturer_name(id.manufacturer()), "Hynix");
        assert_eq!(id.page_size_hint(), 2048);
        assert_eq!(id.block_size_hint(), 128 * 1024);
        assert_eq!(id.spare_per_512_hint(), 16);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(
            DeviceId::parse_hex("ADDC109554"),
            Some(DeviceId::H27U4G8F2D)
        );
        assert_eq!(
            DeviceId::parse_hex("0xad:dc:10:95:54"),
            Some(DeviceId::H27U4G8F2D)
        );
        assert_eq!(DeviceId::parse_hex("AD DC 10 95"), None);
        assert_eq!(DeviceId::parse_hex("ADDC1095545"), None);
        assert_eq!(DeviceId::parse_hex("ADDC10955Z"), None);
    }
}
