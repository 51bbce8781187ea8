//! Sector staging buffer
//!
//! A RAM image of exactly one sector, assembled in full before it is committed.

use super::layout::{ProtectedRegion, MAX_PROTECTED_LEN};
use crate::platform::traits::{FlashInterface, ERASED_BYTE, SECTOR_SIZE};
use crate::platform::{PlatformError, Result};
use heapless::Vec;

/// One sector's worth of RAM used to build the next sector image
pub struct SectorBuffer {
    bytes: [u8; SECTOR_SIZE],
}

impl SectorBuffer {
    /// Create an erased staging buffer
    pub const fn new() -> Self {
        Self {
            bytes: [ERASED_BYTE; SECTOR_SIZE],
        }
    }

    /// Copy the current content of `sector` from flash
    pub fn load<F: FlashInterface>(&mut self, flash: &F, sector: u32) -> Result<()> {
        flash.read(sector, &mut self.bytes)
    }

    /// Set every byte to `value`
    pub fn fill(&mut self, value: u8) {
        self.bytes.fill(value);
    }

    /// Copy `data` into the image at `offset`
    ///
    /// # Panics
    ///
    /// Panics if `offset + data.len()` exceeds [`SECTOR_SIZE`]; callers reject
    /// such spans before touching the buffer.
    pub fn overlay(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    /// The assembled image
    pub fn as_bytes(&self) -> &[u8; SECTOR_SIZE] {
        &self.bytes
    }
}

impl Default for SectorBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy of the protected bytes taken before a sector is rewritten
#[derive(Debug, Clone)]
pub struct ProtectedSnapshot {
    region: ProtectedRegion,
    bytes: Vec<u8, MAX_PROTECTED_LEN>,
}

impl ProtectedSnapshot {
    /// Read the current protected bytes from flash
    pub fn capture<F: FlashInterface>(flash: &F, region: ProtectedRegion) -> Result<Self> {
        let mut bytes = Vec::new();
        bytes
            .resize(region.len(), ERASED_BYTE)
            .map_err(|_| PlatformError::InvalidConfig)?;
        flash.read(region.start(), &mut bytes)?;
        Ok(Self { region, bytes })
    }

    /// Write the captured bytes back over their place in a sector image
    pub fn restore_into(&self, buffer: &mut SectorBuffer) {
        buffer.overlay(self.region.offset_in_sector(), &self.bytes);
    }

    /// The captured bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
