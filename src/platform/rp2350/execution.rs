//! RAM-residency check for RP2350

use crate::platform::traits::ExecutionLocation;
use core::ops::Range;

/// Start of striped SRAM
const SRAM_BASE: usize = 0x2000_0000;

/// End of SRAM (520 KB including the two scratch banks)
const SRAM_END: usize = 0x2008_2000;

/// Execution-location guard for firmware built to run from RAM
///
/// The flash window is unreadable while any sector is erased or programmed, so
/// code fetched from *any* part of flash is at risk whatever the target sector.
/// The check therefore ignores `target` and answers whether this crate's code
/// lies outside SRAM. The address is sampled on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RamExecutionGuard;

impl RamExecutionGuard {
    /// Create a new guard
    pub const fn new() -> Self {
        Self
    }
}

#[inline(never)]
fn code_marker() -> usize {
    code_marker as usize
}

impl ExecutionLocation for RamExecutionGuard {
    fn executes_from(&self, _target: Range<u32>) -> bool {
        let pc = code_marker();
        !(SRAM_BASE..SRAM_END).contains(&pc)
    }
}
