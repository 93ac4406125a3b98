// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::RegionError;

/// Flash window reserved for the application image.
///
/// The last `metadata_size` bytes hold integrity data that is not part of the
/// CRC. The window is always a whole number of flash pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryRegion {
    start: u32,
    end: u32,
    page_size: u32,
    metadata_size: u32,
}

impl MemoryRegion {
    /// Checked constructor, usable in `const` items.
    pub const fn new(start: u32, end: u32, page_size: u32, metadata_size: u32) -> Result<Self, RegionError> {
        if start >= end {
            return Err(RegionError::Empty);
        }
        if page_size == 0 {
            return Err(RegionError::ZeroPageSize);
        }
        if (end - start) % page_size != 0 {
            return Err(RegionError::PageMisaligned);
        }
        if metadata_size > end - start {
            return Err(RegionError::MetadataTooLarge);
        }
        Ok(Self {
            start,
            end,
            page_size,
            metadata_size,
        })
    }

    pub const fn start(&self) -> u32 {
        self.start
    }

    /// First address past the region.
    pub const fn end(&self) -> u32 {
        self.end
    }

    pub const fn size(&self) -> u32 {
        self.end - self.start
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    pub const fn page_count(&self) -> u32 {
        self.size() / self.page_size
    }

    pub const fn metadata_size(&self) -> u32 {
        self.metadata_size
    }

    /// End of the CRC covered part of the region.
    pub const fn crc_end(&self) -> u32 {
        self.end - self.metadata_size
    }

    /// Whether `len` bytes starting at `address` lie inside the region.
    pub fn contains(&self, address: u32, len: usize) -> bool {
        let Ok(len) = u32::try_from(len) else {
            return false;
        };
        match address.checked_add(len) {
            Some(last) => address >= self.start && last <= self.end,
            None => false,
        }
    }
}
