//! Flash interface trait
//!
//! This module defines the raw flash primitives that platform implementations must provide.
//! Everything above this trait (sector merge, protected-byte preservation, blank checks)
//! lives in [`crate::storage`].

use crate::platform::Result;

/// Smallest erasable unit (4 KB on RP2040/RP2350)
pub const SECTOR_SIZE: usize = 4096;

/// Value of every byte after an erase
pub const ERASED_BYTE: u8 = 0xFF;

/// Flash interface trait
///
/// Offsets are relative to the start of flash, not XIP bus addresses.
///
/// # Flash Characteristics
///
/// - Flash is organized in 4 KB sectors
/// - Erase operations set all bytes to 0xFF
/// - Program operations can only change bits from 1→0 (must erase first to reset to 1)
/// - Erase/program are blocking and assumed atomic once invoked
///
/// # Safety Invariants
///
/// - Implementations do not mask interrupts themselves; the caller holds an
///   [`InterruptGuard`](crate::storage::guard::InterruptGuard) around every
///   `erase_sector`/`program_sector`
/// - Implementations do not validate protected ranges; that is the engine's job
pub trait FlashInterface {
    /// Read `buf.len()` bytes starting at `offset`
    ///
    /// This is a plain load from memory-mapped flash and does not mutate anything.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range is out of bounds.
    /// Returns `PlatformError::Flash(FlashError::ReadFailed)` if the read operation fails.
    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<()>;

    /// Erase the sector starting at `offset`
    ///
    /// `offset` must be sector-aligned.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if misaligned or out of bounds.
    /// Returns `PlatformError::Flash(FlashError::EraseFailed)` if the hardware reports a failure.
    fn erase_sector(&mut self, offset: u32) -> Result<()>;

    /// Program one full sector at `offset` from `data`
    ///
    /// The sector must have been erased first.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if misaligned or out of bounds.
    /// Returns `PlatformError::Flash(FlashError::WriteFailed)` if the hardware reports a failure.
    fn program_sector(&mut self, offset: u32, data: &[u8; SECTOR_SIZE]) -> Result<()>;

    /// Total flash capacity in bytes
    fn capacity(&self) -> u32;
}
