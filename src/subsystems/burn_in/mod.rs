//! Flash burn-in subsystem
//!
//! # Usage
//!
//! ```ignore
//! static PROGRESS: HarnessProgress = HarnessProgress::new();
//!
//! let mut harness = BurnInHarness::new(&mut engine, &PROGRESS, BurnInParams::from_build_env());
//! let report = harness.run(&mut Unattended, || abort_requested())?;
//! if !report.is_clean() {
//!     log_warn!("{} unexpected mismatches", report.unexpected_mismatches());
//! }
//! ```

pub mod harness;
pub mod patterns;
pub mod progress;
pub mod report;

pub use harness::BurnInHarness;
pub use patterns::{TestPattern, PATTERNS};
pub use progress::{HarnessProgress, ProgressSnapshot};
pub use report::{AbortReason, BurnInReport, CycleReport, HarnessState, MAX_REPORTED_CYCLES};
