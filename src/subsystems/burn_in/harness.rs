//! Burn-in harness
//!
//! Runs `cycles` full passes of every pattern over the whole flash: erase,
//! blank check, write, verify. The protected record is never overwritten, so
//! each pass finds it twice (once as non-erased, once as not matching the
//! pattern). A healthy device reports exactly that baseline and nothing more.

use super::patterns::{TestPattern, PATTERNS};
use super::progress::HarnessProgress;
use super::report::{AbortReason, BurnInReport, CycleReport, HarnessState};
use crate::core::confirm::Confirm;
use crate::parameters::burn_in::BurnInParams;
use crate::platform::traits::{ExecutionLocation, FlashInterface, InterruptControl, SECTOR_SIZE};
use crate::platform::{FlashError, PlatformError, Result};
use crate::storage::FlashEngine;

/// Bytes read per verify step
const VERIFY_CHUNK: usize = 256;

/// Reason a run stopped early
enum Stop {
    Abort(AbortReason),
    Fault(PlatformError),
}

impl From<PlatformError> for Stop {
    fn from(error: PlatformError) -> Self {
        match error {
            PlatformError::Flash(FlashError::SelfDestructionRisk) => {
                Stop::Abort(AbortReason::SelfDestructionRisk)
            }
            other => Stop::Fault(other),
        }
    }
}

type Step<T> = core::result::Result<T, Stop>;

/// Mismatches found in one pass
#[derive(Default)]
struct PassCounts {
    erase: u64,
    write: u64,
}

/// Whole-flash erase/write/verify stress test
pub struct BurnInHarness<'a, F, I, X> {
    engine: &'a mut FlashEngine<F, I, X>,
    progress: &'a HarnessProgress,
    params: BurnInParams,
    report: BurnInReport,
}

impl<'a, F, I, X> BurnInHarness<'a, F, I, X>
where
    F: FlashInterface,
    I: InterruptControl,
    X: ExecutionLocation,
{
    /// Create a harness over `engine`, publishing progress to `progress`
    pub fn new(
        engine: &'a mut FlashEngine<F, I, X>,
        progress: &'a HarnessProgress,
        params: BurnInParams,
    ) -> Self {
        Self {
            engine,
            progress,
            params,
            report: BurnInReport::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> HarnessState {
        self.report.state
    }

    /// Results so far, including those of a failed run
    pub fn report(&self) -> &BurnInReport {
        &self.report
    }

    /// Run the whole test
    ///
    /// `abort` is polled before every pass and between sectors; once it returns
    /// `true` nothing else is written or erased.
    ///
    /// # Errors
    ///
    /// Flash failures other than `SelfDestructionRisk` end the run in
    /// `Aborted` and are returned; [`report`](Self::report) still holds the
    /// partial results.
    pub fn run(
        &mut self,
        confirm: &mut impl Confirm,
        mut abort: impl FnMut() -> bool,
    ) -> Result<BurnInReport> {
        self.report = BurnInReport::default();
        self.report.state = HarnessState::Confirming;

        if !confirm.confirm("Burn-in erases and rewrites the entire flash. Proceed?") {
            crate::log_info!("Burn-in declined");
            self.report.state = HarnessState::Idle;
            return Ok(self.report.clone());
        }

        self.progress.start();
        let outcome = self.run_cycles(&mut abort);
        self.progress.stop();

        match outcome {
            Ok(()) => {
                self.report.state = HarnessState::Finished;
                crate::log_info!(
                    "Burn-in finished: {} mismatches, {} expected",
                    self.report.total_mismatches,
                    self.report.expected_baseline
                );
                Ok(self.report.clone())
            }
            Err(Stop::Abort(reason)) => {
                crate::log_warn!("Burn-in aborted: {:?}", reason);
                self.report.state = HarnessState::Aborted;
                self.report.abort_reason = Some(reason);
                Ok(self.report.clone())
            }
            Err(Stop::Fault(error)) => {
                crate::log_error!("Burn-in failed: {}", error);
                self.report.state = HarnessState::Aborted;
                self.report.abort_reason = Some(AbortReason::Fault(error));
                Err(error)
            }
        }
    }

    fn run_cycles(&mut self, abort: &mut impl FnMut() -> bool) -> Step<()> {
        let full = self.engine.layout().full_range();
        self.engine.ensure_not_executing_from(full)?;

        for cycle in 0..self.params.cycles() {
            let mut cycle_report = CycleReport {
                cycle,
                ..Default::default()
            };

            for (index, pattern) in PATTERNS.iter().enumerate() {
                if abort() {
                    return Err(Stop::Abort(AbortReason::Requested));
                }

                let index = index as u8;
                self.report.state = HarnessState::Running {
                    cycle,
                    pattern: index,
                };
                self.progress.set_pass(cycle, index);

                let counts = self.run_pass(pattern, abort)?;
                crate::log_info!(
                    "Cycle {} pattern {:#x}/{:#x}: {} erase mismatches, {} write mismatches",
                    cycle + 1,
                    pattern.even,
                    pattern.odd,
                    counts.erase,
                    counts.write
                );

                cycle_report.erase_mismatches += counts.erase;
                cycle_report.write_mismatches += counts.write;
                self.record_pass(&counts);
            }

            self.report.cycles_completed += 1;
            self.report
                .cycles
                .push(cycle_report)
                .map_err(|_| Stop::Fault(PlatformError::InvalidConfig))?;
        }

        self.erase_all_sectors(abort)
    }

    fn run_pass(&mut self, pattern: &TestPattern, abort: &mut impl FnMut() -> bool) -> Step<PassCounts> {
        self.erase_all_sectors(abort)?;
        let erase = self.blank_mismatches()?;

        let mut image = [0u8; SECTOR_SIZE];
        pattern.fill(&mut image);
        for sector in self.engine.layout().sectors() {
            if abort() {
                return Err(Stop::Abort(AbortReason::Requested));
            }
            self.progress.set_sector(sector);
            self.engine.write(sector, &image)?;
        }

        let write = self.verify(pattern)?;
        Ok(PassCounts { erase, write })
    }

    fn record_pass(&mut self, counts: &PassCounts) {
        let protected_len = self.engine.layout().protected().len() as u64;

        self.report.patterns_written += 1;
        self.report.total_mismatches += counts.erase + counts.write;
        self.report.expected_baseline = protected_len * 2 * u64::from(self.report.patterns_written);
    }

    fn erase_all_sectors(&mut self, abort: &mut impl FnMut() -> bool) -> Step<()> {
        for sector in self.engine.layout().sectors() {
            if abort() {
                return Err(Stop::Abort(AbortReason::Requested));
            }
            self.progress.set_sector(sector);
            self.engine.erase(sector)?;
        }
        Ok(())
    }

    fn blank_mismatches(&self) -> Result<u64> {
        let full = self.engine.layout().full_range();
        let result = self.engine.blank_check(full)?.finish()?;
        Ok(result.total_mismatches)
    }

    fn verify(&self, pattern: &TestPattern) -> Result<u64> {
        let mut buf = [0u8; VERIFY_CHUNK];
        let mut mismatches = 0;

        for address in self.engine.layout().full_range().step_by(VERIFY_CHUNK) {
            self.engine.read(address, &mut buf)?;
            mismatches += u64::from(pattern.mismatches(address, &buf));
        }
        Ok(mismatches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::confirm::{Decline, Unattended};
    use crate::platform::mock::{factory_record_byte, MockExecution, MockFlash, MockInterrupts};
    use crate::storage::{FlashLayout, ProtectedRegion};

    const CAPACITY: u32 = 8 * SECTOR_SIZE as u32;
    const LAYOUT: FlashLayout = FlashLayout::new(CAPACITY, ProtectedRegion::new(0x3000, 0, 107));

    type Engine = FlashEngine<MockFlash, MockInterrupts, MockExecution>;

    fn engine_from(flash: MockFlash) -> (Engine, MockExecution) {
        let exec = MockExecution::in_ram();
        let engine = FlashEngine::new(flash, MockInterrupts::new(), exec.clone(), LAYOUT).unwrap();
        (engine, exec)
    }

    fn setup() -> (Engine, MockExecution) {
        engine_from(MockFlash::with_factory_record(&LAYOUT))
    }

    #[test]
    fn test_healthy_run_matches_baseline() {
        let (mut engine, _) = setup();
        let progress = HarnessProgress::new();
        let mut harness = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(2));

        let report = harness.run(&mut Unattended, || false).unwrap();

        assert_eq!(report.state, HarnessState::Finished);
        assert_eq!(report.cycles_completed, 2);
        assert_eq!(report.patterns_written, 10);
        assert_eq!(report.expected_baseline, 107 * 2 * 5 * 2);
        assert_eq!(report.total_mismatches, report.expected_baseline);
        assert!(report.is_clean());
        assert!(!progress.is_active());
    }

    #[test]
    fn test_cycle_reports() {
        let (mut engine, _) = setup();
        let progress = HarnessProgress::new();
        let mut harness = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(3));

        let report = harness.run(&mut Unattended, || false).unwrap();

        assert_eq!(report.cycles.len(), 3);
        for (i, cycle) in report.cycles.iter().enumerate() {
            assert_eq!(cycle.cycle, i as u8);
            assert_eq!(cycle.erase_mismatches, 107 * 5);
            assert_eq!(cycle.write_mismatches, 107 * 5);
        }
    }

    #[test]
    fn test_flash_left_erased_with_record() {
        let (mut engine, _) = setup();
        let progress = HarnessProgress::new();
        BurnInHarness::new(&mut engine, &progress, BurnInParams::new(1))
            .run(&mut Unattended, || false)
            .unwrap();

        let result = engine.blank_check(0..CAPACITY).unwrap().finish().unwrap();
        assert_eq!(result.total_mismatches, 107);
        let record = engine.flash().contents(0x3000, 107);
        assert!(record.iter().enumerate().all(|(i, &b)| b == factory_record_byte(i)));
    }

    #[test]
    fn test_declined_stays_idle() {
        let (mut engine, exec) = setup();
        let progress = HarnessProgress::new();
        let mut harness = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(1));

        let report = harness.run(&mut Decline, || false).unwrap();

        assert_eq!(report.state, HarnessState::Idle);
        assert_eq!(harness.state(), HarnessState::Idle);
        assert_eq!(report.patterns_written, 0);
        drop(harness);
        assert_eq!(engine.flash().total_erase_count(), 0);
        assert_eq!(exec.queries(), 0);
    }

    #[test]
    fn test_guard_aborts_before_any_pass() {
        let (mut engine, exec) = setup();
        exec.run_from_flash(0x6000..0x6400);
        let progress = HarnessProgress::new();
        let mut harness = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(1));

        let report = harness.run(&mut Unattended, || false).unwrap();

        assert_eq!(report.state, HarnessState::Aborted);
        assert_eq!(report.abort_reason, Some(AbortReason::SelfDestructionRisk));
        drop(harness);
        assert_eq!(engine.flash().total_erase_count(), 0);
    }

    #[test]
    fn test_abort_stops_hardware_immediately() {
        let (mut engine, _) = setup();
        let progress = HarnessProgress::new();
        let mut polls = 0;

        let report = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(5))
            .run(&mut Unattended, || {
                polls += 1;
                polls > 4 // before-pass poll, then three sector erases
            })
            .unwrap();

        assert_eq!(report.state, HarnessState::Aborted);
        assert_eq!(report.abort_reason, Some(AbortReason::Requested));
        assert_eq!(report.patterns_written, 0);
        assert_eq!(report.total_mismatches, 0);
        assert_eq!(engine.flash().total_erase_count(), 3);
        assert_eq!(engine.flash().total_program_count(), 0);
        assert!(!progress.is_active());
    }

    #[test]
    fn test_abort_skips_final_erase() {
        let (mut engine, _) = setup();
        let progress = HarnessProgress::new();
        let sectors = LAYOUT.sector_count();
        // One cycle: per pass 1 + 2 * sectors polls, then the final erase
        let budget = 5 * (1 + 2 * sectors);
        let mut polls = 0;

        let report = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(1))
            .run(&mut Unattended, || {
                polls += 1;
                polls > budget
            })
            .unwrap();

        assert_eq!(report.state, HarnessState::Aborted);
        assert_eq!(report.cycles_completed, 1);
        assert_eq!(report.total_mismatches, report.expected_baseline);
        // Last pattern still in flash
        assert_eq!(engine.flash().contents(0x0000, 2), [0xAA, 0x55]);
    }

    #[test]
    fn test_code_moving_into_flash_mid_run_aborts() {
        let (mut engine, exec) = setup();
        let progress = HarnessProgress::new();
        let relocate = exec.clone();
        let mut polls = 0;

        let report = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(1))
            .run(&mut Unattended, || {
                polls += 1;
                if polls == 3 {
                    // Sector 0x0000 already erased
                    relocate.run_from_flash(0x5000..0x5010);
                }
                false
            })
            .unwrap();

        assert_eq!(report.state, HarnessState::Aborted);
        assert_eq!(report.abort_reason, Some(AbortReason::SelfDestructionRisk));
        assert_eq!(report.patterns_written, 0);
        // Sectors below 0x5000 erased, the protected one through a commit
        assert_eq!(engine.flash().total_erase_count(), 5);
        assert_eq!(engine.flash().total_program_count(), 1);
        assert_eq!(engine.flash().erase_count(0x5000), 0);
        assert_eq!(engine.flash().erase_count(0x6000), 0);
        assert!(!progress.is_active());
    }

    #[test]
    fn test_every_cycle_reported_at_cycle_limit() {
        let (mut engine, _) = setup();
        let progress = HarnessProgress::new();

        let report = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(34))
            .run(&mut Unattended, || false)
            .unwrap();

        assert_eq!(report.state, HarnessState::Finished);
        assert_eq!(report.cycles_completed, 32);
        assert_eq!(report.cycles.len(), 32);
        assert_eq!(report.cycles.last().map(|c| c.cycle), Some(31));
    }

    #[test]
    fn test_stuck_bit_reported() {
        let mut flash = MockFlash::with_factory_record(&LAYOUT);
        flash.inject_stuck_bits(0x1000, 0x01);
        let (mut engine, _) = engine_from(flash);
        let progress = HarnessProgress::new();

        let report = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(1))
            .run(&mut Unattended, || false)
            .unwrap();

        assert_eq!(report.state, HarnessState::Finished);
        assert!(!report.is_clean());
        // Five erases read 0xFE, plus 0x55 at an even address in two patterns
        assert_eq!(report.unexpected_mismatches(), 7);
    }

    #[test]
    fn test_flash_fault_propagated() {
        let mut flash = MockFlash::with_factory_record(&LAYOUT);
        flash.fail_next_erase();
        let (mut engine, _) = engine_from(flash);
        let progress = HarnessProgress::new();
        let mut harness = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(1));

        let result = harness.run(&mut Unattended, || false);

        assert_eq!(result, Err(FlashError::EraseFailed.into()));
        assert_eq!(harness.state(), HarnessState::Aborted);
        assert_eq!(
            harness.report().abort_reason,
            Some(AbortReason::Fault(FlashError::EraseFailed.into()))
        );
        assert!(!progress.is_active());
    }

    #[test]
    fn test_progress_visible_during_run() {
        let (mut engine, _) = setup();
        let progress = HarnessProgress::new();
        let mut seen_cycles = [false; 2];

        BurnInHarness::new(&mut engine, &progress, BurnInParams::new(2))
            .run(&mut Unattended, || {
                let snapshot = progress.snapshot();
                assert!(snapshot.active);
                seen_cycles[snapshot.cycle as usize] = true;
                false
            })
            .unwrap();

        assert_eq!(seen_cycles, [true, true]);
    }
}
