//! Mock execution-location query for testing

use crate::platform::traits::ExecutionLocation;
use core::cell::Cell;
use core::ops::Range;
use std::rc::Rc;

#[derive(Debug, Default)]
struct ExecState {
    /// Flash range the code runs from, `None` when running from RAM
    code: Cell<Option<(u32, u32)>>,
    queries: Cell<u32>,
}

/// Mock execution-location query
///
/// Defaults to "running from RAM". Clones share state, so a test can hand one
/// clone to the engine and move the code into flash later.
#[derive(Debug, Clone, Default)]
pub struct MockExecution {
    state: Rc<ExecState>,
}

impl MockExecution {
    /// Code runs from RAM (every flash range is safe to mutate)
    pub fn in_ram() -> Self {
        Self::default()
    }

    /// Code runs from the flash offsets in `code`
    pub fn from_flash(code: Range<u32>) -> Self {
        let exec = Self::default();
        exec.run_from_flash(code);
        exec
    }

    /// Move the running code into flash
    pub fn run_from_flash(&self, code: Range<u32>) {
        self.state.code.set(Some((code.start, code.end)));
    }

    /// Move the running code back into RAM
    pub fn run_from_ram(&self) {
        self.state.code.set(None);
    }

    /// Number of times the location has been queried
    pub fn queries(&self) -> u32 {
        self.state.queries.get()
    }
}

impl ExecutionLocation for MockExecution {
    fn executes_from(&self, target: Range<u32>) -> bool {
        self.state.queries.set(self.state.queries.get() + 1);
        match self.state.code.get() {
            Some((start, end)) => start < target.end && target.start < end,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_detection() {
        let exec = MockExecution::from_flash(0x1000..0x3000);

        assert!(exec.executes_from(0x2000..0x3000));
        assert!(exec.executes_from(0x0000..0x1001));
        assert!(!exec.executes_from(0x3000..0x4000));
        assert!(!exec.executes_from(0x0000..0x1000));
    }

    #[test]
    fn test_clones_share_location() {
        let exec = MockExecution::in_ram();
        let handle = exec.clone();

        assert!(!exec.executes_from(0..0x1000));
        handle.run_from_flash(0..0x1000);
        assert!(exec.executes_from(0..0x1000));
        assert_eq!(handle.queries(), 2);
    }
}
