//! Subsystems built on the flash engine

pub mod burn_in;
pub mod status_indicator;
