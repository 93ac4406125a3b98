// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Control transfer to the application.
//!
//! This is the only place where the bootloader gives up control. Nothing here
//! checks the image; callers verify it before getting this far.

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use self::cortex::jump_to_vector;

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod cortex {
    use crate::log;
    use crate::VectorTable;
    use cortex_m::peripheral::SCB;

    /// Relocate the vector table to `base` and branch to the application reset handler.
    ///
    /// # Safety
    ///
    /// This modifies the stack pointer and vector table and runs code placed at `base`.
    pub unsafe fn jump_to_vector(base: u32, vector: VectorTable) -> ! {
        log::info!("msp = {:#x}, rv = {:#x}", vector.initial_sp, vector.reset_vector);

        cortex_m::interrupt::disable();
        (*SCB::PTR).vtor.write(base);
        cortex_m::asm::dsb();
        cortex_m::asm::isb();

        // These instructions perform the following operations:
        //
        // * Modify control register to use MSP as stack pointer (clear spsel bit)
        // * Synchronize instruction barrier
        // * Initialize stack pointer from the image
        // * Set link register to not return (0xFF)
        // * Jump to the application reset vector
        core::arch::asm!(
            "mrs {tmp}, CONTROL",
            "bics {tmp}, {spsel}",
            "msr CONTROL, {tmp}",
            "isb",
            "msr MSP, {msp}",
            "mov lr, {new_lr}",
            "bx {rv}",
            // `out(reg) _` is not permitted in a `noreturn` asm! call,
            // so instead use `in(reg) 0` and don't restore it afterwards.
            tmp = in(reg) 0,
            spsel = in(reg) 2,
            new_lr = in(reg) 0xFFFFFFFFu32,
            msp = in(reg) vector.initial_sp,
            rv = in(reg) vector.reset_vector,
            options(noreturn),
        );
    }
}
