//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the flash primitives the
//! storage engine consumes. All platform-specific code is isolated here.

pub mod error;
pub mod interrupts;
pub mod traits;

// Platform implementations (feature-gated)
#[cfg(feature = "rp2350")]
pub mod rp2350;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{FlashError, PlatformError, Result};
pub use interrupts::CriticalSectionInterrupts;
pub use traits::{ExecutionLocation, FlashInterface, InterruptControl};
