//! Execution-location query
//!
//! Erasing the flash that currently holds the running code is program
//! self-destruction. Destructive storage operations ask this trait first, on
//! every call.

use core::ops::Range;

/// Query whether executing code resides in a flash range
pub trait ExecutionLocation {
    /// Returns `true` if code currently executing may be fetched from `target`
    ///
    /// `target` is a flash-relative offset range. Implementations that cannot
    /// tell which part of flash the code occupies must answer `true` whenever
    /// the code runs from flash at all.
    fn executes_from(&self, target: Range<u32>) -> bool;
}
