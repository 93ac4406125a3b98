// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::crc::Crc32Digest;
use crate::log;
use crate::{BootError, BootOperations, MemoryRegion, VectorTable, WORD_SIZE};
use core::convert::Infallible;

/// Bytes read from flash per step while computing the CRC.
const CRC_CHUNK: usize = 64;

/// Progress of an update, as seen by one manager instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateState {
    /// Nothing erased yet by this instance
    Unerased,
    /// Application region erased, writes go straight to flash
    Erased,
    /// The last CRC check passed and nothing was written since
    Verified,
}

/// Erases, programs and verifies the application region, then jumps to it.
///
/// The write cursor and the erase flag live as long as the manager: a new
/// instance (after a reset, for example) starts writing at the region start
/// and erases again before its first write.
pub struct BootManager<O> {
    operations: Option<O>,
    region: MemoryRegion,
    erased: bool,
    verified: bool,
    cursor: u32,
}

impl<O: BootOperations> BootManager<O> {
    /// Manager with no operations bound yet.
    pub fn new(region: MemoryRegion) -> Self {
        Self {
            operations: None,
            region,
            erased: false,
            verified: false,
            cursor: region.start(),
        }
    }

    pub fn with_operations(region: MemoryRegion, operations: O) -> Self {
        let mut manager = Self::new(region);
        manager.operations = Some(operations);
        manager
    }

    /// Bind new operations, returning the previous ones. Takes effect on the next call.
    pub fn set_bootloader_operations(&mut self, operations: O) -> Option<O> {
        self.operations.replace(operations)
    }

    pub fn take_operations(&mut self) -> Option<O> {
        self.operations.take()
    }

    pub fn operations(&self) -> Option<&O> {
        self.operations.as_ref()
    }

    pub fn operations_mut(&mut self) -> Option<&mut O> {
        self.operations.as_mut()
    }

    fn ops(&mut self) -> Result<&mut O, BootError> {
        self.operations.as_mut().ok_or(BootError::NotBound)
    }

    /// Copy `dst.len()` bytes of flash at `address` into `dst`.
    ///
    /// Both `address` and the length must be multiples of the flash word.
    /// The address is not checked against the application region.
    pub fn read(&mut self, address: u32, dst: &mut [u8]) -> Result<(), BootError> {
        let ops = self.ops()?;
        if address % WORD_SIZE != 0 || dst.len() % WORD_SIZE as usize != 0 {
            return Err(BootError::Misaligned { address, len: dst.len() });
        }

        ops.unlock();
        let ok = ops.read(address, dst);
        ops.lock();

        if ok {
            Ok(())
        } else {
            Err(BootError::ReadFailed { address })
        }
    }

    /// Program `data` at `start`.
    ///
    /// The first write of a manager erases the whole application region. If
    /// the erase fails nothing is written, and the next write tries again.
    pub fn write(&mut self, start: u32, data: &[u8]) -> Result<(), BootError> {
        self.ops()?;
        if !self.region.contains(start, data.len()) {
            log::warn!("Write of {} bytes at {:#x} outside application", data.len(), start);
            return Err(BootError::OutOfBounds {
                address: start,
                len: data.len(),
            });
        }
        if !self.erased {
            self.erase_app()?;
        }

        let ops = self.ops()?;
        ops.unlock();
        let ok = ops.write(start, data);
        ops.lock();

        if ok {
            self.verified = false;
            Ok(())
        } else {
            log::warn!("Programming failed at {:#x}", start);
            Err(BootError::WriteFailed { address: start })
        }
    }

    /// Program `data` at the write cursor and move the cursor past it.
    ///
    /// The cursor only moves when the write succeeds.
    pub fn write_continuous(&mut self, data: &[u8]) -> Result<(), BootError> {
        let address = self.cursor;
        self.write(address, data)?;
        // `write` checked the range, this can't overflow
        self.cursor = address + data.len() as u32;
        log::debug!("Cursor at {:#x}", self.cursor);
        Ok(())
    }

    /// Erase the application region. The cursor is left where it is.
    pub fn erase_app(&mut self) -> Result<(), BootError> {
        let ops = self.ops()?;
        ops.unlock();
        let ok = ops.erase_app();
        ops.lock();

        if ok {
            log::info!("Application erased");
            self.erased = true;
            self.verified = false;
            Ok(())
        } else {
            log::error!("Application erase failed");
            Err(BootError::EraseFailed)
        }
    }

    /// CRC32 of the application region, without the metadata tail.
    pub fn calculate_crc(&mut self) -> Result<u32, BootError> {
        let start = self.region.start();
        let end = self.region.crc_end();
        let ops = self.ops()?;

        ops.unlock();
        let mut digest = Crc32Digest::new();
        let mut buf = [0u8; CRC_CHUNK];
        let mut address = start;
        while address < end {
            let len = ((end - address) as usize).min(CRC_CHUNK);
            let chunk = &mut buf[..len];
            if !ops.read(address, chunk) {
                ops.lock();
                return Err(BootError::ReadFailed { address });
            }
            digest.update(chunk);
            address += len as u32;
        }
        ops.lock();

        Ok(digest.finalize())
    }

    /// Compare the application CRC with `expected`.
    pub fn verify_crc(&mut self, expected: u32) -> Result<(), BootError> {
        let actual = self.calculate_crc()?;
        if actual != expected {
            log::warn!("CRC mismatch: expected {:#x}, got {:#x}", expected, actual);
            self.verified = false;
            return Err(BootError::CrcMismatch { expected, actual });
        }
        log::info!("Application CRC {:#x} ok", actual);
        self.verified = true;
        Ok(())
    }

    /// Tear down the bootloader and start the application.
    ///
    /// The entry point is the second word of the vector table at the region
    /// start. This only returns if no operations are bound or the vector table
    /// could not be read; in the latter case the peripherals are already torn
    /// down.
    ///
    /// # Safety
    ///
    /// Runs the code found in the application region. The image must be fully
    /// written and checked, e.g. with [`BootManager::verify_crc`], before
    /// calling this.
    pub unsafe fn jump_to_app(&mut self) -> Result<Infallible, BootError> {
        let start = self.region.start();
        let ops = self.ops()?;

        ops.deinit_peripherals();
        let mut raw = [0u8; VectorTable::SIZE];
        ops.unlock();
        let ok = ops.read(start, &mut raw);
        ops.lock();
        if !ok {
            log::error!("Can't read vector table at {:#x}", start);
            return Err(BootError::ReadFailed { address: start });
        }
        let vector = VectorTable::from_bytes(raw);
        ops.deinit_systick();

        log::info!("Jumping to {:#x}", vector.reset_vector);
        ops.start_app(vector)
    }

    pub fn state(&self) -> UpdateState {
        match (self.erased, self.verified) {
            (_, true) => UpdateState::Verified,
            (true, false) => UpdateState::Erased,
            (false, false) => UpdateState::Unerased,
        }
    }

    pub fn is_erased(&self) -> bool {
        self.erased
    }

    /// Next address written by [`BootManager::write_continuous`].
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn region(&self) -> &MemoryRegion {
        &self.region
    }

    pub fn app_start(&self) -> u32 {
        self.region.start()
    }

    pub fn app_end(&self) -> u32 {
        self.region.end()
    }

    pub fn app_size(&self) -> u32 {
        self.region.size()
    }

    pub fn page_size(&self) -> u32 {
        self.region.page_size()
    }
}
