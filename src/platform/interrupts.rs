//! Interrupt control backed by the `critical-section` crate
//!
//! On RP2350 the implementation comes from `rp235x-hal`'s
//! `critical-section-impl` feature (PRIMASK plus the hardware spinlock), on the
//! host from `critical-section/std`.

use crate::platform::traits::InterruptControl;
use critical_section::RestoreState;

/// [`InterruptControl`] using the global critical-section implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalSectionInterrupts;

impl CriticalSectionInterrupts {
    /// Create a new critical-section interrupt controller
    pub const fn new() -> Self {
        Self
    }
}

impl InterruptControl for CriticalSectionInterrupts {
    type State = RestoreState;

    fn mask(&self) -> RestoreState {
        // SAFETY: every acquire is paired with exactly one release by
        // InterruptGuard's Drop, in LIFO order.
        unsafe { critical_section::acquire() }
    }

    unsafe fn restore(&self, state: RestoreState) {
        // SAFETY: forwarded from the caller contract of InterruptControl::restore
        unsafe { critical_section::release(state) }
    }
}
