//! Flash geometry and the protected factory range
//!
//! # Memory Layout (Raspberry Pi Pico, 2 MB)
//!
//! ```text
//! [Sectors]            0x000000 - 0x07F000
//! [Factory sector]     0x07F000 - 0x080000 (4 KB)
//!   [Test record]      0x07F000 - 0x07F06B (107 bytes) - NEVER MODIFIED
//! [Sectors]            0x080000 - 0x200000
//! ```
//!
//! [`FlashLayout::PICO`] is the RP2040 Pico's 2 MB part. Boards driven by the
//! `rp2350` backend (Pico 2 carries 4 MB) need a layout built with
//! [`FlashLayout::new`] from the board's flash size and the location of its
//! factory record.

use crate::platform::traits::SECTOR_SIZE;
use crate::platform::{PlatformError, Result};
use core::ops::Range;

/// Largest protected range a layout may declare
pub const MAX_PROTECTED_LEN: usize = 256;

/// Flash capacity of the Raspberry Pi Pico
pub const PICO_FLASH_CAPACITY: u32 = 2 * 1024 * 1024;

/// Round `offset` down to the start of its sector
pub const fn sector_base(offset: u32) -> u32 {
    offset - offset % SECTOR_SIZE as u32
}

/// A misaligned sector offset and the sector it was rounded down to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlignmentCorrection {
    /// Offset as requested by the caller
    pub requested: u32,
    /// Sector start actually used
    pub aligned: u32,
}

impl AlignmentCorrection {
    /// Align `offset` to its sector, reporting a correction if it moved
    pub fn align(offset: u32) -> (u32, Option<Self>) {
        let aligned = sector_base(offset);
        let correction = (aligned != offset).then_some(Self {
            requested: offset,
            aligned,
        });
        (aligned, correction)
    }

    /// Distance the offset was moved back
    pub fn shift(&self) -> u32 {
        self.requested - self.aligned
    }
}

/// Bytes inside one sector that no erase or write may alter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtectedRegion {
    sector: u32,
    offset: u16,
    len: u16,
}

impl ProtectedRegion {
    /// Pico manufacturing test record: 107 bytes at the start of sector 0x7F000
    pub const PICO_FACTORY_RECORD: ProtectedRegion = ProtectedRegion::new(0x7F000, 0, 107);

    /// Declare a protected range
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if `sector` is not
    /// sector-aligned, `len` is zero or above [`MAX_PROTECTED_LEN`], or the range
    /// leaves the sector.
    pub const fn new(sector: u32, offset_in_sector: usize, len: usize) -> Self {
        assert!(
            sector % SECTOR_SIZE as u32 == 0,
            "protected sector must be sector-aligned"
        );
        assert!(
            len > 0 && len <= MAX_PROTECTED_LEN,
            "protected length out of range"
        );
        assert!(
            offset_in_sector + len <= SECTOR_SIZE,
            "protected range must stay inside its sector"
        );
        Self {
            sector,
            offset: offset_in_sector as u16,
            len: len as u16,
        }
    }

    /// Start of the sector holding the protected bytes
    pub const fn sector(&self) -> u32 {
        self.sector
    }

    /// Offset of the first protected byte within its sector
    pub const fn offset_in_sector(&self) -> usize {
        self.offset as usize
    }

    /// Number of protected bytes
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Always `false`; a protected range holds at least one byte
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Flash offset of the first protected byte
    pub const fn start(&self) -> u32 {
        self.sector + self.offset as u32
    }

    /// Protected bytes as flash offsets
    pub fn absolute_range(&self) -> Range<u32> {
        self.start()..self.start() + self.len as u32
    }

    /// Protected bytes as indices into a sector image
    pub fn range_in_sector(&self) -> Range<usize> {
        self.offset_in_sector()..self.offset_in_sector() + self.len()
    }

    /// Whether `sector` is the sector holding the protected bytes
    pub const fn is_in_sector(&self, sector: u32) -> bool {
        self.sector == sector
    }
}

/// Geometry of the flash being rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashLayout {
    capacity: u32,
    protected: ProtectedRegion,
}

impl FlashLayout {
    /// Raspberry Pi Pico (RP2040): 2 MB flash, factory test record at 0x7F000
    pub const PICO: FlashLayout =
        FlashLayout::new(PICO_FLASH_CAPACITY, ProtectedRegion::PICO_FACTORY_RECORD);

    /// Declare a layout
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a non-zero multiple of the sector size or the
    /// protected sector lies beyond it. Use [`try_new`](Self::try_new) for
    /// values only known at runtime.
    pub const fn new(capacity: u32, protected: ProtectedRegion) -> Self {
        assert!(
            Self::is_valid(capacity, &protected),
            "invalid flash layout"
        );
        Self {
            capacity,
            protected,
        }
    }

    /// Declare a layout from runtime values
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::InvalidConfig` when [`new`](Self::new) would panic.
    pub fn try_new(capacity: u32, protected: ProtectedRegion) -> Result<Self> {
        if !Self::is_valid(capacity, &protected) {
            return Err(PlatformError::InvalidConfig);
        }
        Ok(Self {
            capacity,
            protected,
        })
    }

    const fn is_valid(capacity: u32, protected: &ProtectedRegion) -> bool {
        capacity > 0 && capacity % SECTOR_SIZE as u32 == 0 && protected.sector() < capacity
    }

    /// Total bytes covered by the layout
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The protected factory range
    pub const fn protected(&self) -> ProtectedRegion {
        self.protected
    }

    /// Number of sectors
    pub const fn sector_count(&self) -> u32 {
        self.capacity / SECTOR_SIZE as u32
    }

    /// Whole address space as offsets
    pub fn full_range(&self) -> Range<u32> {
        0..self.capacity
    }

    /// Start offset of every sector, in ascending order
    pub fn sectors(&self) -> impl Iterator<Item = u32> {
        (0..self.capacity).step_by(SECTOR_SIZE)
    }

    /// Whether `offset` addresses a byte inside the layout
    pub const fn contains(&self, offset: u32) -> bool {
        offset < self.capacity
    }
}
