//! Build-time parameters
//!
//! Defaults are injected by `build.rs` as `cargo:rustc-env` values and parsed
//! here at runtime, so a bad value falls back instead of breaking the build.

pub mod burn_in;

pub use burn_in::BurnInParams;
