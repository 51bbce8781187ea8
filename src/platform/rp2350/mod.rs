//! RP2350 platform implementation
//!
//! Raw flash primitives through the boot ROM and a RAM-residency check. Interrupt
//! masking uses [`CriticalSectionInterrupts`](crate::platform::CriticalSectionInterrupts),
//! backed by `rp235x-hal`'s critical-section implementation.
//!
//! [`FlashLayout::PICO`](crate::storage::FlashLayout::PICO) describes the RP2040
//! Pico. Pair [`Rp2350Flash`] with a layout of the same capacity, for example
//! `FlashLayout::new(4 * 1024 * 1024, record)` on a Pico 2.

mod execution;
mod flash;

pub use execution::RamExecutionGuard;
pub use flash::{Rp2350Flash, XIP_BASE};
