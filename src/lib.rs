#![cfg_attr(not(test), no_std)]

//! pico_flash_utility - Flash rewrite engine and burn-in harness for Raspberry Pi Pico
//!
//! This library erases and rewrites on-board flash sector by sector while
//! preserving the factory test record, and stress-tests the whole device
//! with a multi-pattern burn-in.

#[cfg(all(feature = "mock", not(test)))]
extern crate std;

// Platform abstraction layer (flash primitives, interrupt masking, execution location)
pub mod platform;

// Core utilities (logging, confirmation)
pub mod core;

// Protected-region flash engine
pub mod storage;

// Burn-in harness and status indicator
pub mod subsystems;

// Build-time parameters
pub mod parameters;
