//! Progress shared with interrupt context
//!
//! The harness is the only writer. The status indicator reads from its timer
//! interrupt, so every field is a single atomic and no lock is needed.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Live burn-in progress
#[derive(Debug)]
pub struct HarnessProgress {
    active: AtomicBool,
    cycle: AtomicU8,
    pattern: AtomicU8,
    sector: AtomicU32,
}

/// Point-in-time copy of [`HarnessProgress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgressSnapshot {
    pub active: bool,
    pub cycle: u8,
    pub pattern: u8,
    pub sector: u32,
}

impl HarnessProgress {
    /// Idle progress, usable in a `static`
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            cycle: AtomicU8::new(0),
            pattern: AtomicU8::new(0),
            sector: AtomicU32::new(0),
        }
    }

    /// Read every field
    ///
    /// Fields are loaded one by one, so a snapshot taken mid-update may mix two
    /// neighbouring steps. That is fine for display.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            active: self.active.load(Ordering::Relaxed),
            cycle: self.cycle.load(Ordering::Relaxed),
            pattern: self.pattern.load(Ordering::Relaxed),
            sector: self.sector.load(Ordering::Relaxed),
        }
    }

    /// Whether a run is in progress
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub(crate) fn start(&self) {
        self.cycle.store(0, Ordering::Relaxed);
        self.pattern.store(0, Ordering::Relaxed);
        self.sector.store(0, Ordering::Relaxed);
        self.active.store(true, Ordering::Release);
    }

    pub(crate) fn set_pass(&self, cycle: u8, pattern: u8) {
        self.cycle.store(cycle, Ordering::Relaxed);
        self.pattern.store(pattern, Ordering::Relaxed);
    }

    pub(crate) fn set_sector(&self, sector: u32) {
        self.sector.store(sector, Ordering::Relaxed);
    }

    pub(crate) fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Default for HarnessProgress {
    fn default() -> Self {
        Self::new()
    }
}
