//! Burn-in state and results

use crate::platform::PlatformError;
use heapless::Vec;

/// Cycles kept in a report
pub const MAX_REPORTED_CYCLES: usize = 32;

/// Burn-in state machine
///
/// `Idle -> Confirming -> Running -> Finished | Aborted`. A declined
/// confirmation goes back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HarnessState {
    #[default]
    Idle,
    Confirming,
    Running { cycle: u8, pattern: u8 },
    Finished,
    Aborted,
}

/// Why a run ended in [`HarnessState::Aborted`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbortReason {
    /// The abort signal was raised
    Requested,
    /// Code was found executing from flash
    SelfDestructionRisk,
    /// A flash operation failed
    Fault(PlatformError),
}

/// Mismatches found in one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub cycle: u8,
    /// Non-erased bytes found after the erases
    pub erase_mismatches: u64,
    /// Bytes differing from the pattern after the writes
    pub write_mismatches: u64,
}

/// Result of a burn-in run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BurnInReport {
    pub state: HarnessState,
    pub abort_reason: Option<AbortReason>,
    pub cycles_completed: u8,
    /// Completed (erase, check, write, verify) passes
    pub patterns_written: u32,
    pub total_mismatches: u64,
    /// Mismatches caused by the protected record alone
    pub expected_baseline: u64,
    pub cycles: Vec<CycleReport, MAX_REPORTED_CYCLES>,
}

impl BurnInReport {
    /// Distance between the observed and the expected mismatch count
    pub fn unexpected_mismatches(&self) -> u64 {
        self.total_mismatches.abs_diff(self.expected_baseline)
    }

    /// Finished with nothing but the protected record mismatching
    pub fn is_clean(&self) -> bool {
        self.state == HarnessState::Finished && self.unexpected_mismatches() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_mismatches() {
        let report = BurnInReport {
            state: HarnessState::Finished,
            total_mismatches: 5357,
            expected_baseline: 5350,
            ..Default::default()
        };
        assert_eq!(report.unexpected_mismatches(), 7);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clean_requires_finished() {
        let mut report = BurnInReport {
            state: HarnessState::Aborted,
            total_mismatches: 214,
            expected_baseline: 214,
            ..Default::default()
        };
        assert!(!report.is_clean());
        report.state = HarnessState::Finished;
        assert!(report.is_clean());
    }
}
