// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_std]
#![no_main]
mod platform;

use defmt_rtt as _;
// global logger
use embassy_nrf as _;
// time driver
use panic_probe as _;

use boot_manager::{BootError, BootManager, BootOperations, MemoryRegion};
use consts::{APP_END, APP_START, FLASH_BASE, METADATA_SIZE, PAGE_SIZE};
use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::nvmc::Nvmc;
use embassy_time::Timer;
use platform::NrfPlatform;

/// Start address of the bootloader, read by the MBR from UICR.
#[used]
#[link_section = ".mbr_uicr_bootloader_addr"]
pub static BOOTLOADER_ADDR: u32 = consts::BASE_BOOTLOADER_ADDR;

const APP_REGION: MemoryRegion = match MemoryRegion::new(APP_START, APP_END, PAGE_SIZE, METADATA_SIZE) {
    Ok(region) => region,
    Err(_) => panic!("invalid application layout"),
};

/// Compare the application CRC with the one stored in the metadata tail.
fn check_app<O: BootOperations>(manager: &mut BootManager<O>) -> Result<(), BootError> {
    let mut stored = [0u8; METADATA_SIZE as usize];
    manager.read(APP_REGION.crc_end(), &mut stored)?;
    manager.verify_crc(u32::from_le_bytes(stored))
}

fn park() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());

    // Init a GPIO to use as bootloader trigger
    let boot_gpio = Input::new(p.P0_11, Pull::Up);
    Timer::after_millis(1).await;
    let stay = boot_gpio.is_low();
    drop(boot_gpio);

    let flash = Nvmc::new(p.NVMC);
    let ops = boot_manager::FlashOperations::new(flash, NrfPlatform, APP_REGION, FLASH_BASE);
    let mut manager = BootManager::with_operations(APP_REGION, ops);
    info!(
        "Application {:#x}..{:#x}, {} pages",
        manager.app_start(),
        manager.app_end(),
        APP_REGION.page_count()
    );

    if stay {
        info!("Boot pin held, staying in bootloader");
        park();
    }

    match check_app(&mut manager) {
        Ok(()) => {
            // Nothing we can do if this returns, the peripherals may already be gone
            if let Err(e) = unsafe { manager.jump_to_app() } {
                error!("Jump failed: {}", e);
            }
        }
        Err(e) => error!("Application not bootable: {}", e),
    }
    park();
}
