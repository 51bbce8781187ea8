//! Scoped interrupt masking
//!
//! Every raw erase/program happens while an [`InterruptGuard`] is alive.
//! Construction masks, drop restores, so early `?` returns cannot leave
//! interrupts disabled.

use crate::platform::traits::InterruptControl;

/// RAII interrupt mask
///
/// # Example
///
/// ```
/// use pico_flash_utility::platform::CriticalSectionInterrupts;
/// use pico_flash_utility::storage::guard::InterruptGuard;
///
/// # fn erase() -> Result<(), ()> { Ok(()) }
/// let irq = CriticalSectionInterrupts::new();
/// {
///     let _masked = InterruptGuard::new(&irq);
///     erase()?;
/// } // restored here, also when erase() fails
/// # Ok::<(), ()>(())
/// ```
#[must_use = "interrupts are restored as soon as the guard is dropped"]
pub struct InterruptGuard<'a, I: InterruptControl> {
    control: &'a I,
    state: Option<I::State>,
}

impl<'a, I: InterruptControl> InterruptGuard<'a, I> {
    /// Mask interrupts until the returned guard is dropped
    pub fn new(control: &'a I) -> Self {
        let state = control.mask();
        Self {
            control,
            state: Some(state),
        }
    }
}

impl<I: InterruptControl> Drop for InterruptGuard<'_, I> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            // SAFETY: `state` came from the mask in `new`; guards are dropped in
            // reverse construction order, which keeps restores LIFO.
            unsafe { self.control.restore(state) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockInterrupts;

    fn failing_step(irq: &MockInterrupts) -> Result<(), ()> {
        let _masked = InterruptGuard::new(irq);
        assert!(irq.is_masked());
        Err(())
    }

    #[test]
    fn test_guard_masks_for_its_lifetime() {
        let irq = MockInterrupts::new();
        {
            let _masked = InterruptGuard::new(&irq);
            assert!(irq.is_masked());
        }
        assert!(!irq.is_masked());
        assert_eq!(irq.mask_count(), 1);
    }

    #[test]
    fn test_guard_restores_on_error_path() {
        let irq = MockInterrupts::new();
        assert!(failing_step(&irq).is_err());
        assert_eq!(irq.depth(), 0);
    }

    #[test]
    fn test_nested_guards_restore_in_order() {
        let irq = MockInterrupts::new();
        let outer = InterruptGuard::new(&irq);
        {
            let _inner = InterruptGuard::new(&irq);
            assert_eq!(irq.depth(), 2);
        }
        assert_eq!(irq.depth(), 1);
        drop(outer);
        assert_eq!(irq.depth(), 0);
    }
}
