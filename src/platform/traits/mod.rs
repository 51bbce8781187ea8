//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod execution;
pub mod flash;
pub mod interrupt;

// Re-export trait interfaces
pub use execution::ExecutionLocation;
pub use flash::{FlashInterface, ERASED_BYTE, SECTOR_SIZE};
pub use interrupt::InterruptControl;
