//! Flash storage engine
//!
//! Sector erase, sector-bounded write and blank check on top of the raw
//! [`FlashInterface`](crate::platform::traits::FlashInterface) primitives, with
//! one protected record that survives every operation.

pub mod blank_check;
pub mod guard;
pub mod layout;
pub mod rewrite;
pub mod staging;

pub use blank_check::{BlankCheckResult, BlankScan, DirtyChunk, CHUNK_SIZE};
pub use guard::InterruptGuard;
pub use layout::{AlignmentCorrection, FlashLayout, ProtectedRegion};
pub use rewrite::{EraseReport, FlashEngine, SectorImage};
