// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! IEEE 802.3 CRC32 (reflected polynomial `0xEDB88320`, `!0` seed, complemented result).
//!
//! The 256 entry lookup table is computed at compile time and shared by every
//! manager instance.

use ::crc::{Crc, Digest, CRC_32_ISO_HDLC};

static CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// One-shot CRC32 of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// Incremental CRC32 for data that arrives in chunks.
pub struct Crc32Digest {
    digest: Digest<'static, u32>,
}

impl Crc32Digest {
    pub fn new() -> Self {
        Self { digest: CRC32.digest() }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.digest.update(bytes);
    }

    pub fn finalize(self) -> u32 {
        self.digest.finalize()
    }
}

impl Default for Crc32Digest {
    fn default() -> Self {
        Self::new()
    }
}
