// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

/// Failure of a boot manager operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// No capability is bound to the manager
    NotBound,
    /// The application region could not be erased
    EraseFailed,
    /// Programming or readback verification failed
    WriteFailed { address: u32 },
    /// Reading the mapped flash failed
    ReadFailed { address: u32 },
    /// The access does not fit in the application region
    OutOfBounds { address: u32, len: usize },
    /// Address or length is not a multiple of the flash word
    Misaligned { address: u32, len: usize },
    /// The application CRC does not match the expected value
    CrcMismatch { expected: u32, actual: u32 },
}

impl core::fmt::Display for BootError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BootError::NotBound => write!(f, "no boot operations bound"),
            BootError::EraseFailed => write!(f, "application erase failed"),
            BootError::WriteFailed { address } => write!(f, "write failed at {address:#010x}"),
            BootError::ReadFailed { address } => write!(f, "read failed at {address:#010x}"),
            BootError::OutOfBounds { address, len } => {
                write!(f, "{len} bytes at {address:#010x} exceed the application region")
            }
            BootError::Misaligned { address, len } => {
                write!(f, "{len} bytes at {address:#010x} are not word aligned")
            }
            BootError::CrcMismatch { expected, actual } => {
                write!(f, "crc mismatch: expected {expected:#010x}, got {actual:#010x}")
            }
        }
    }
}

/// Invalid application memory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegionError {
    /// `start` is not below `end`
    Empty,
    ZeroPageSize,
    /// The region is not a whole number of pages
    PageMisaligned,
    /// The metadata tail is larger than the region
    MetadataTooLarge,
}

impl core::fmt::Display for RegionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegionError::Empty => write!(f, "region start is not below its end"),
            RegionError::ZeroPageSize => write!(f, "page size is zero"),
            RegionError::PageMisaligned => write!(f, "region is not a whole number of pages"),
            RegionError::MetadataTooLarge => write!(f, "metadata does not fit in the region"),
        }
    }
}
