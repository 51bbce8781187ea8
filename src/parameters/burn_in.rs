//! Burn-in parameters
//!
//! # Parameters
//!
//! - `BURN_IN_CYCLES` - full erase/write/verify cycles per run (1..=32, default 5)

use crate::subsystems::burn_in::report::MAX_REPORTED_CYCLES;

/// Cycles run when nothing else is configured
pub const DEFAULT_CYCLES: u8 = 5;

/// Burn-in run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BurnInParams {
    cycles: u8,
}

impl BurnInParams {
    /// Configuration with `cycles` clamped to the supported range
    pub fn new(cycles: u8) -> Self {
        Self {
            cycles: cycles.clamp(1, MAX_REPORTED_CYCLES as u8),
        }
    }

    /// Number of cycles, each one writing every pattern once
    pub fn cycles(&self) -> u8 {
        self.cycles
    }

    /// Load defaults from build-time environment variables
    ///
    /// Set `BURN_IN_CYCLES` when building to change the cycle count.
    pub fn from_build_env() -> Self {
        Self::parse(env!("BURN_IN_CYCLES"))
    }

    fn parse(cycles: &str) -> Self {
        match cycles.trim().parse::<u8>() {
            Ok(value) => Self::new(value),
            Err(_) => {
                crate::log_warn!("Invalid BURN_IN_CYCLES, using {}", DEFAULT_CYCLES);
                Self::new(DEFAULT_CYCLES)
            }
        }
    }
}

impl Default for BurnInParams {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cycles() {
        assert_eq!(BurnInParams::default().cycles(), 5);
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(BurnInParams::parse("3").cycles(), 3);
        assert_eq!(BurnInParams::parse(" 12 ").cycles(), 12);
    }

    #[test]
    fn test_parse_invalid_falls_back() {
        assert_eq!(BurnInParams::parse("").cycles(), DEFAULT_CYCLES);
        assert_eq!(BurnInParams::parse("five").cycles(), DEFAULT_CYCLES);
        assert_eq!(BurnInParams::parse("300").cycles(), DEFAULT_CYCLES);
    }

    #[test]
    fn test_cycles_clamped() {
        assert_eq!(BurnInParams::new(0).cycles(), 1);
        assert_eq!(BurnInParams::new(33).cycles(), 32);
        assert_eq!(BurnInParams::new(200).cycles(), 32);
    }

    #[test]
    fn test_from_build_env_in_range() {
        let params = BurnInParams::from_build_env();
        assert!((1..=32).contains(&params.cycles()));
    }
}
