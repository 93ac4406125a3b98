// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use boot_manager::jump::jump_to_vector;
use boot_manager::{Platform, VectorTable};
use consts::APP_START;
use cortex_m::peripheral::{NVIC, SYST};
use defmt::info;

/// Teardown and hand-off for the nRF52 behind the Nordic MBR.
pub struct NrfPlatform;

impl Platform for NrfPlatform {
    fn deinit_peripherals(&mut self) {
        // Disable active interrupts and drop anything pending
        unsafe {
            let nvic = &*NVIC::PTR;
            for icer in nvic.icer.iter() {
                icer.write(0xFFFF_FFFF);
            }
            for icpr in nvic.icpr.iter() {
                icpr.write(0xFFFF_FFFF);
            }
        }
    }

    fn deinit_systick(&mut self) {
        unsafe {
            let syst = &*SYST::PTR;
            syst.csr.write(0);
            syst.rvr.write(0);
            syst.cvr.write(0);
        }
    }

    unsafe fn start_app(&mut self, vector: VectorTable) -> ! {
        use nrf_softdevice_mbr as mbr;

        // Interrupts go through the MBR, send them to the application
        let mut cmd = mbr::sd_mbr_command_t {
            command: mbr::NRF_MBR_COMMANDS_SD_MBR_COMMAND_IRQ_FORWARD_ADDRESS_SET,
            params: mbr::sd_mbr_command_t__bindgen_ty_1 {
                irq_forward_address_set: mbr::sd_mbr_command_irq_forward_address_set_t { address: APP_START },
            },
        };
        let ret = mbr::sd_mbr_command(&mut cmd);
        info!("ret forward irq mbr result {}", ret);

        jump_to_vector(APP_START, vector)
    }
}
