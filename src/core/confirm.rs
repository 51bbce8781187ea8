//! Confirmation of destructive operations
//!
//! Erasing flash and running the burn-in are destructive. The interactive layer
//! asks the operator; unattended callers pass [`Unattended`].

/// Source of an explicit yes/no answer before a destructive operation
pub trait Confirm {
    /// Return `true` only on an explicit affirmative answer
    ///
    /// `prompt` describes what is about to be destroyed.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirmation source that always agrees (unattended runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct Unattended;

impl Confirm for Unattended {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Confirmation source that always declines
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl Confirm for Decline {
    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }
}

/// Outcome of an operation gated by [`Confirm`]
///
/// Declining is not an error: nothing was done and nothing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Confirmed<T> {
    /// The operation was declined; no hardware action was taken
    Declined,
    /// The operation ran to completion
    Done(T),
}

impl<T> Confirmed<T> {
    /// The completed value, if the operation ran
    pub fn done(self) -> Option<T> {
        match self {
            Confirmed::Declined => None,
            Confirmed::Done(value) => Some(value),
        }
    }

    /// Whether the operation was declined
    pub fn is_declined(&self) -> bool {
        matches!(self, Confirmed::Declined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_confirm_sees_prompt() {
        let mut seen = None;
        let mut ask = |prompt: &str| {
            seen = Some(prompt.len());
            prompt.starts_with("Erase")
        };
        assert!(ask.confirm("Erase sector 0x1000"));
        assert!(!ask.confirm("Run burn-in"));
        assert_eq!(seen, Some("Run burn-in".len()));
    }

    #[test]
    fn test_confirmed_accessors() {
        assert_eq!(Confirmed::Done(3).done(), Some(3));
        assert!(Confirmed::<u8>::Declined.is_declined());
        assert!(Unattended.confirm("anything"));
        assert!(!Decline.confirm("anything"));
    }
}
