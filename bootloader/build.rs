// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! This build script generates `memory.x` from the flash layout in the
//! `consts` crate and puts it in a directory where the linker can always
//! find it at build time, so the bootloader partition always starts where
//! the application region ends.

use consts_global::{BASE_BOOTLOADER_ADDR, BOOTLOADER_SIZE, FLASH_BASE};
use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    // UICR, RAM and the MBR hand-off below are nRF52 specific
    if FLASH_BASE != 0 {
        panic!("the bootloader only supports the nRF52 flash layout (flash at {:#X})", FLASH_BASE);
    }

    let memory_x_content = format!(
        r##"
        BASE_BOOTLOADER_ADDR = {:#X};

        MEMORY
        {{
            /* NOTE 1 K = 1 KiBi = 1024 bytes */
            /* The bootloader flash partition is the end of flash, right after the application */
            /* No need to reserve RAM for SoftDevice as it is not executed at all in bootloader */
            FLASH (rx) : ORIGIN = BASE_BOOTLOADER_ADDR, LENGTH = {:#X}
            RAM : ORIGIN = 0x20000008, LENGTH = 24K - 8
            mbr_uicr_bootloader_addr (r) : ORIGIN = 0x10001014, LENGTH = 0x4
        }}

        SECTIONS {{
            .mbr_uicr_bootloader_addr :  {{
                KEEP(*(.mbr_uicr_bootloader_addr))
                . = ALIGN(4);
            }} > mbr_uicr_bootloader_addr
        }};
        "##,
        BASE_BOOTLOADER_ADDR, BOOTLOADER_SIZE
    );
    // Put `memory.x` in our output directory and ensure it's
    // on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(memory_x_content.as_bytes())
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    // The layout comes from the consts crate, rebuild when it changes
    println!("cargo:rerun-if-changed=../consts/src/lib.rs");

    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
