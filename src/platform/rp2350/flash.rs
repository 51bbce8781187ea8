//! RP2350 Flash implementation
//!
//! This module provides raw sector erase/program for RP2350 using ROM functions.
//!
//! # Safety
//!
//! Flash operations use unsafe ROM functions and must:
//! - Run with interrupts masked (XIP inaccessible); the storage engine holds an
//!   `InterruptGuard` around every call
//! - Not access XIP memory during erase/program, so the calling firmware must be
//!   built to execute from RAM (checked by [`RamExecutionGuard`](super::RamExecutionGuard))

use crate::platform::{
    error::FlashError,
    traits::{FlashInterface, SECTOR_SIZE},
    Result,
};
use rp235x_hal::rom_data;

/// Base of the memory-mapped flash window
pub const XIP_BASE: u32 = 0x1000_0000;

/// Flash sector erase command (0x20 for 4KB sector)
const SECTOR_ERASE_CMD: u8 = 0x20;

/// RP2350 Flash implementation
///
/// # Important
///
/// - Flash operations are blocking (a sector erase takes tens of ms)
/// - XIP is inaccessible during erase/program (other core will fault)
///
/// # Example
///
/// ```ignore
/// use pico_flash_utility::platform::rp2350::Rp2350Flash;
/// use pico_flash_utility::platform::traits::FlashInterface;
///
/// let flash = Rp2350Flash::new(2 * 1024 * 1024);
/// let mut buf = [0u8; 16];
/// flash.read(0x7F000, &mut buf).unwrap();
/// ```
pub struct Rp2350Flash {
    capacity: u32,
}

impl Rp2350Flash {
    /// Create a new RP2350 Flash instance for a chip of `capacity` bytes
    pub const fn new(capacity: u32) -> Self {
        Self { capacity }
    }

    /// Check a raw primitive's sector offset
    fn check_sector(&self, offset: u32) -> Result<()> {
        if offset % SECTOR_SIZE as u32 != 0 || offset >= self.capacity {
            return Err(FlashError::InvalidAddress.into());
        }
        Ok(())
    }

    /// Execute Flash operation with XIP disabled
    ///
    /// # Safety
    ///
    /// - Interrupts must already be masked by the caller
    /// - XIP is inaccessible (other core will fault if accessing Flash)
    /// - Must not access XIP memory in the closure
    unsafe fn with_xip_disabled<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        // SAFETY: Prepare Flash for serial operations
        // This must be called before any erase/program operations
        rom_data::connect_internal_flash();
        rom_data::flash_exit_xip();

        let result = f();

        // SAFETY: Flush cache to make changes visible
        rom_data::flash_flush_cache();

        // SAFETY: Restore XIP mode for normal operation
        rom_data::flash_enter_cmd_xip();

        result
    }
}

impl FlashInterface for Rp2350Flash {
    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<()> {
        let end = offset
            .checked_add(buf.len() as u32)
            .ok_or(FlashError::InvalidAddress)?;
        if end > self.capacity {
            return Err(FlashError::InvalidAddress.into());
        }

        // SAFETY: Flash is memory-mapped at XIP_BASE and the range was validated
        // above. Reading from XIP doesn't require disabling XIP.
        unsafe {
            let flash_ptr = (XIP_BASE + offset) as usize as *const u8;
            core::ptr::copy_nonoverlapping(flash_ptr, buf.as_mut_ptr(), buf.len());
        }

        Ok(())
    }

    fn erase_sector(&mut self, offset: u32) -> Result<()> {
        self.check_sector(offset)?;

        // SAFETY: Caller masked interrupts; ROM routine erases exactly one sector
        unsafe {
            self.with_xip_disabled(|| {
                rom_data::flash_range_erase(
                    offset,
                    SECTOR_SIZE,
                    SECTOR_SIZE as u32,
                    SECTOR_ERASE_CMD,
                );
            });
        }

        Ok(())
    }

    fn program_sector(&mut self, offset: u32, data: &[u8; SECTOR_SIZE]) -> Result<()> {
        self.check_sector(offset)?;

        // SAFETY: Caller masked interrupts; `data` is RAM-resident and exactly
        // one sector long (a multiple of the 256-byte page size)
        unsafe {
            self.with_xip_disabled(|| {
                rom_data::flash_range_program(offset, data.as_ptr(), SECTOR_SIZE);
            });
        }

        Ok(())
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }
}
