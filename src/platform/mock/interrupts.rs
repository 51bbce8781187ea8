//! Mock interrupt controller for testing

use crate::platform::traits::InterruptControl;
use core::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct IrqState {
    depth: Cell<u32>,
    mask_count: Cell<u32>,
}

/// Mock interrupt controller
///
/// Tracks masking depth so tests can assert that hardware mutations only happen
/// inside a masked section and that every mask is restored. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockInterrupts {
    state: Rc<IrqState>,
}

impl MockInterrupts {
    /// Create a controller with interrupts enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether interrupts are currently masked
    pub fn is_masked(&self) -> bool {
        self.state.depth.get() > 0
    }

    /// Current nesting depth
    pub fn depth(&self) -> u32 {
        self.state.depth.get()
    }

    /// Total number of mask calls so far
    pub fn mask_count(&self) -> u32 {
        self.state.mask_count.get()
    }
}

impl InterruptControl for MockInterrupts {
    /// Depth before masking
    type State = u32;

    fn mask(&self) -> u32 {
        let depth = self.state.depth.get();
        self.state.depth.set(depth + 1);
        self.state.mask_count.set(self.state.mask_count.get() + 1);
        depth
    }

    unsafe fn restore(&self, state: u32) {
        assert_eq!(
            self.state.depth.get(),
            state + 1,
            "interrupt restore out of LIFO order"
        );
        self.state.depth.set(state);
    }
}
