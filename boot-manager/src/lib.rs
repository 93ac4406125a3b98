// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Application image manager for bootloaders.
//! Erases and programs the application flash window, checks it with CRC32 and
//! hands control over to the freshly written image.
//!
//! The manager is single threaded and not reentrant. Every mutating call takes
//! `&mut self`, and callers that share it with interrupt handlers must wrap the
//! calls in a critical section themselves.

#![cfg_attr(not(test), no_std)]

pub mod crc;
mod error;
pub mod jump;
mod manager;
pub mod ops;
mod region;


pub use error::{BootError, RegionError};
pub use manager::{BootManager, UpdateState};
pub use ops::{BootOperations, FlashOperations, Platform};
pub use region::MemoryRegion;

pub use embedded_storage;

/// Size of the native flash word in bytes.
pub const WORD_SIZE: u32 = 4;

/// First two words of an application image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VectorTable {
    /// Initial main stack pointer
    pub initial_sp: u32,
    /// Entry point of the application
    pub reset_vector: u32,
}

impl VectorTable {
    /// Size of the part of the table we care about.
    pub const SIZE: usize = 8;

    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self {
            initial_sp: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            reset_vector: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }
}

#[cfg(feature = "defmt")]
pub(crate) use defmt as log;

#[cfg(all(feature = "log", not(feature = "defmt")))]
pub(crate) use ::log;

// Arguments are still evaluated by reference so they count as used
#[cfg(not(any(feature = "log", feature = "defmt")))]
pub(crate) mod log {
    macro_rules! info {
        ($($x:expr),* $(,)?) => {{ $(let _ = &$x;)* }};
    }
    pub(crate) use info;
    macro_rules! debug {
        ($($x:expr),* $(,)?) => {{ $(let _ = &$x;)* }};
    }
    pub(crate) use debug;
    macro_rules! warner {
        ($($x:expr),* $(,)?) => {{ $(let _ = &$x;)* }};
    }
    pub(crate) use warner as warn;
    macro_rules! error {
        ($($x:expr),* $(,)?) => {{ $(let _ = &$x;)* }};
    }
    pub(crate) use error;
}
