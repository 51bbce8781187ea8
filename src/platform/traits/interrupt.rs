//! Interrupt masking trait
//!
//! Flash erase/program on XIP parts stalls instruction fetch from flash, so no
//! interrupt may run while a sector is being rewritten. Platform code exposes the
//! mask/restore pair through this trait; callers use it through
//! [`InterruptGuard`](crate::storage::guard::InterruptGuard) only.

/// Interrupt mask/restore primitive pair
pub trait InterruptControl {
    /// Opaque interrupt state captured by [`mask`](Self::mask)
    type State;

    /// Disable interrupts and return the previous state
    fn mask(&self) -> Self::State;

    /// Restore the interrupt state captured by a matching [`mask`](Self::mask)
    ///
    /// # Safety
    ///
    /// `state` must come from the most recent unmatched `mask` call on this
    /// controller. Calls must nest in LIFO order.
    unsafe fn restore(&self, state: Self::State);
}
