//! Array organisation

/// Page, block and address layout of a NAND array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Data bytes per page
    pub data_bytes: u32,
    /// Spare (OOB) bytes per page
    pub spare_bytes: u32,
    /// Pages per erase block
    pub pages_per_block: u32,
    /// Number of erase blocks
    pub blocks: u32,
    /// Linear address distance between two consecutive pages
    ///
    /// The column occupies the low 12 bits of the linear address, so the
    /// row (page index) starts at bit 12. Strides of 2112 per page or
    /// `2048 * 64` per block are not the default; a profile can set them.
    pub page_stride: u32,
}

impl Geometry {
    /// Hynix H27U4G8F2D: 2048 + 64 byte pages, 64 pages per block, 4096 blocks
    pub const H27U4G8F2D: Geometry = Geometry {
        data_bytes: 2048,
        spare_bytes: 64,
        pages_per_block: 64,
        blocks: 4096,
        page_stride: 1 << crate::address::COLUMN_BITS,
    };

    /// Bytes transferred per page read (data + spare)
    pub const fn page_bytes(&self) -> usize {
        (self.data_bytes + self.spare_bytes) as usize
    }

    /// Total number of pages
    pub const fn total_pages(&self) -> u32 {
        self.pages_per_block * self.blocks
    }

    /// Linear address of the first byte of `page`
    pub fn page_address(&self, page: u32) -> Option<u32> {
        if page >= self.total_pages() {
            return None;
        }
        page.checked_mul(self.page_stride)
    }

    /// Linear address of the first page of `block`
    pub fn block_address(&self, block: u32) -> Option<u32> {
        if block >= self.blocks {
            return None;
        }
        block
            .checked_mul(self.pages_per_block)?
            .checked_mul(self.page_stride)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::H27U4G8F2D
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let geometry = Geometry::default();
        assert_eq!(geometry.page_bytes(), 2112);
        assert_eq!(geometry.total_pages(), 64 * 4096);
    }

    #[test]
    fn test_addresses() {
        let geometry = Geometry::default();
        assert_eq!(geometry.page_address(1), Some(0x1000));
        assert_eq!(geometry.block_address(1), Some(0x40000));
        assert_eq!(geometry.block_address(4095), Some(4095 * 64 * 4096));
        assert_eq!(geometry.block_address(4096), None);
        assert_eq!(geometry.page_address(64 * 4096), None);
    }
}
