// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Hardware seam of the boot manager.

use crate::log;
use crate::{MemoryRegion, VectorTable};
use embedded_storage::nor_flash::{NorFlash, NorFlashError, NorFlashErrorKind};

/// Primitives a chip family provides to the boot manager.
///
/// `unlock` and `lock` are called exactly once around every flash access, so
/// implementations don't need to handle nesting.
pub trait BootOperations {
    fn unlock(&mut self);
    fn lock(&mut self);

    /// Erase the whole application region.
    fn erase_app(&mut self) -> bool;

    /// Program `data` at `address` with the native granularity and check each
    /// programmed unit against `data`. Returns `false` on the first mismatch
    /// or hardware fault.
    fn write(&mut self, address: u32, data: &[u8]) -> bool;

    /// Copy `dst.len()` bytes of mapped flash starting at `address`.
    fn read(&mut self, address: u32, dst: &mut [u8]) -> bool;

    /// Best effort teardown, called once right before the jump.
    fn deinit_peripherals(&mut self);

    /// Best effort teardown, called once right before the jump.
    fn deinit_systick(&mut self);

    /// Hand control over to the application.
    ///
    /// # Safety
    ///
    /// Runs whatever code `vector` points to. The image must have been
    /// verified beforehand.
    unsafe fn start_app(&mut self, vector: VectorTable) -> !;
}

impl<T: BootOperations + ?Sized> BootOperations for &mut T {
    fn unlock(&mut self) {
        (**self).unlock()
    }

    fn lock(&mut self) {
        (**self).lock()
    }

    fn erase_app(&mut self) -> bool {
        (**self).erase_app()
    }

    fn write(&mut self, address: u32, data: &[u8]) -> bool {
        (**self).write(address, data)
    }

    fn read(&mut self, address: u32, dst: &mut [u8]) -> bool {
        (**self).read(address, dst)
    }

    fn deinit_peripherals(&mut self) {
        (**self).deinit_peripherals()
    }

    fn deinit_systick(&mut self) {
        (**self).deinit_systick()
    }

    unsafe fn start_app(&mut self, vector: VectorTable) -> ! {
        (**self).start_app(vector)
    }
}

/// Teardown and hand-off hooks of a target, used by [`FlashOperations`].
pub trait Platform {
    fn deinit_peripherals(&mut self);
    fn deinit_systick(&mut self);

    /// # Safety
    ///
    /// See [`BootOperations::start_app`].
    unsafe fn start_app(&mut self, vector: VectorTable) -> !;
}

const VERIFY_CHUNK: usize = 32;

/// [`BootOperations`] on top of an `embedded-storage` NOR flash driver.
///
/// `flash_base` is the bus address of flash offset 0. Drivers handle write
/// enable themselves, so `unlock` and `lock` do nothing.
pub struct FlashOperations<F, P> {
    flash: F,
    platform: P,
    region: MemoryRegion,
    flash_base: u32,
}

impl<F: NorFlash, P: Platform> FlashOperations<F, P> {
    pub fn new(flash: F, platform: P, region: MemoryRegion, flash_base: u32) -> Self {
        Self {
            flash,
            platform,
            region,
            flash_base,
        }
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn release(self) -> (F, P) {
        (self.flash, self.platform)
    }

    fn offset(&self, address: u32) -> Option<u32> {
        address.checked_sub(self.flash_base)
    }
}

impl<F: NorFlash, P: Platform> BootOperations for FlashOperations<F, P> {
    fn unlock(&mut self) {}

    fn lock(&mut self) {}

    fn erase_app(&mut self) -> bool {
        let (Some(from), Some(to)) = (self.offset(self.region.start()), self.offset(self.region.end())) else {
            log::error!("application region below flash base");
            return false;
        };
        log::info!("Erasing {} pages from {:#x}", self.region.page_count(), self.region.start());
        match self.flash.erase(from, to) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Erase failed: {}", describe(e.kind()));
                false
            }
        }
    }

    fn write(&mut self, address: u32, data: &[u8]) -> bool {
        let Some(offset) = self.offset(address) else {
            return false;
        };
        if let Err(e) = self.flash.write(offset, data) {
            log::error!("Write at {:#x} failed: {}", address, describe(e.kind()));
            return false;
        }

        // Read back what was programmed
        let mut buf = [0u8; VERIFY_CHUNK];
        let mut at = offset;
        for chunk in data.chunks(VERIFY_CHUNK) {
            let readback = &mut buf[..chunk.len()];
            if self.flash.read(at, readback).is_err() || readback != chunk {
                log::warn!("Readback mismatch at {:#x}", self.flash_base + at);
                return false;
            }
            at += chunk.len() as u32;
        }
        true
    }

    fn read(&mut self, address: u32, dst: &mut [u8]) -> bool {
        let Some(offset) = self.offset(address) else {
            return false;
        };
        match self.flash.read(offset, dst) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Read at {:#x} failed: {}", address, describe(e.kind()));
                false
            }
        }
    }

    fn deinit_peripherals(&mut self) {
        self.platform.deinit_peripherals()
    }

    fn deinit_systick(&mut self) {
        self.platform.deinit_systick()
    }

    unsafe fn start_app(&mut self, vector: VectorTable) -> ! {
        self.platform.start_app(vector)
    }
}

fn describe(kind: NorFlashErrorKind) -> &'static str {
    match kind {
        NorFlashErrorKind::NotAligned => "not aligned",
        NorFlashErrorKind::OutOfBounds => "out of bounds",
        _ => "other",
    }
}
