//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```ignore
//! use pico_flash_utility::platform::mock::{MockExecution, MockFlash, MockInterrupts};
//! use pico_flash_utility::storage::{FlashEngine, FlashLayout};
//!
//! let layout = FlashLayout::PICO;
//! let flash = MockFlash::with_factory_record(&layout);
//! let mut engine = FlashEngine::new(flash, MockInterrupts::new(), MockExecution::in_ram(), layout)?;
//! engine.write(0x1000, b"hello")?;
//! ```

#![cfg(any(test, feature = "mock"))]

mod execution;
mod flash;
mod interrupts;

pub use execution::MockExecution;
pub use flash::{factory_record_byte, MockFlash};
pub use interrupts::MockInterrupts;
