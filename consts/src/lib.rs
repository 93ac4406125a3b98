// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Flash layout of the supported targets.
//! The layout is picked with a Cargo feature; `stm32g0` wins when both are enabled.

#![cfg_attr(not(test), no_std)]

#[cfg(not(any(feature = "nrf52805", feature = "stm32g0")))]
compile_error!("select a target layout feature: `nrf52805` or `stm32g0`");

#[cfg(not(feature = "stm32g0"))]
mod layout {
    /// Bus address of flash offset 0.
    pub const FLASH_BASE: u32 = 0x0;

    /// Total flash size (192KB).
    pub const FLASH_SIZE: u32 = 0x30000;

    /// Start of the application, right after the SoftDevice.
    pub const APP_START: u32 = 0x19000;

    /// End of the application (exclusive). The bootloader starts here.
    pub const APP_END: u32 = 0x26000;

    /// nRF52 flash page (4KB).
    pub const PAGE_SIZE: u32 = 4096;

    /// Start address of the bootloader, stored in UICR for the MBR.
    pub const BASE_BOOTLOADER_ADDR: u32 = APP_END;

    /// The bootloader runs to the end of flash.
    pub const BOOTLOADER_SIZE: u32 = FLASH_BASE + FLASH_SIZE - BASE_BOOTLOADER_ADDR;
}

#[cfg(feature = "stm32g0")]
mod layout {
    pub const FLASH_BASE: u32 = 0x0800_0000;

    /// Total flash size (128KB).
    pub const FLASH_SIZE: u32 = 0x20000;

    /// Start of the application; the first 24KB hold the bootloader.
    pub const APP_START: u32 = 0x0800_6000;

    /// End of the application (exclusive), which is the end of flash.
    pub const APP_END: u32 = 0x0802_0000;

    /// STM32G0 flash page (2KB).
    pub const PAGE_SIZE: u32 = 0x800;

    /// The bootloader boots from the start of flash.
    pub const BASE_BOOTLOADER_ADDR: u32 = FLASH_BASE;

    /// Everything below the application.
    pub const BOOTLOADER_SIZE: u32 = APP_START - FLASH_BASE;
}

pub use layout::*;

/// Bytes at the end of the application region kept out of the CRC.
/// They hold the expected CRC of the rest of the region.
pub const METADATA_SIZE: u32 = 4;

/// Size of the application region.
pub const APP_SIZE: u32 = APP_END - APP_START;

const _: () = assert!(APP_START < APP_END);
const _: () = assert!(APP_SIZE % PAGE_SIZE == 0);
const _: () = assert!(APP_END <= FLASH_BASE + FLASH_SIZE);
const _: () = assert!(BOOTLOADER_SIZE > 0);
const _: () = assert!(BASE_BOOTLOADER_ADDR >= FLASH_BASE);
const _: () = assert!(BASE_BOOTLOADER_ADDR + BOOTLOADER_SIZE <= FLASH_BASE + FLASH_SIZE);
const _: () = assert!(BASE_BOOTLOADER_ADDR + BOOTLOADER_SIZE <= APP_START || BASE_BOOTLOADER_ADDR >= APP_END);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootloader_partition_is_inside_flash() {
        let flash_end = FLASH_BASE as u64 + FLASH_SIZE as u64;
        let bootloader_end = BASE_BOOTLOADER_ADDR as u64 + BOOTLOADER_SIZE as u64;
        assert!(BASE_BOOTLOADER_ADDR >= FLASH_BASE);
        assert!(bootloader_end <= flash_end);
    }

    #[test]
    fn bootloader_and_application_do_not_overlap() {
        let bootloader_end = BASE_BOOTLOADER_ADDR + BOOTLOADER_SIZE;
        assert!(bootloader_end <= APP_START || BASE_BOOTLOADER_ADDR >= APP_END);
    }

    #[test]
    fn application_holds_its_metadata() {
        assert!(METADATA_SIZE <= APP_SIZE);
        assert_eq!(APP_SIZE % PAGE_SIZE, 0);
    }
}
