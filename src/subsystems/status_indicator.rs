//! Burn-in status LED
//!
//! While a burn-in runs, the LED blinks the current cycle number (1-based)
//! every 15 seconds: 300 ms off, 200 ms on per blink. [`StatusBlinker::tick`]
//! is meant to be called from a 100 ms periodic timer.

use super::burn_in::HarnessProgress;
use embedded_hal::digital::OutputPin;

/// Period between [`StatusBlinker::tick`] calls
pub const TICK_MS: u32 = 100;

const WAIT_TICKS: u16 = 15_000 / TICK_MS as u16;
const ON_TICKS: u16 = 200 / TICK_MS as u16;
const OFF_TICKS: u16 = 300 / TICK_MS as u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Waiting,
    Burst { lit: bool, blinks: u8 },
}

/// Blink sequencer driven by [`HarnessProgress`]
#[derive(Debug, Clone)]
pub struct StatusBlinker {
    phase: Phase,
    ticks: u16,
}

impl StatusBlinker {
    /// Create a blinker with the LED off and a full wait ahead
    pub const fn new() -> Self {
        Self {
            phase: Phase::Waiting,
            ticks: 0,
        }
    }

    /// Advance by one tick, returning the new LED level when it changes
    ///
    /// The blink count is read from `progress` at every blink, so a cycle
    /// change mid-burst is picked up by the next blink.
    pub fn tick(&mut self, progress: &HarnessProgress) -> Option<bool> {
        let snapshot = progress.snapshot();
        if !snapshot.active {
            let was_lit = matches!(self.phase, Phase::Burst { lit: true, .. });
            *self = Self::new();
            return was_lit.then_some(false);
        }

        self.ticks = self.ticks.saturating_add(1);
        match self.phase {
            Phase::Waiting => {
                if self.ticks >= WAIT_TICKS {
                    self.phase = Phase::Burst {
                        lit: false,
                        blinks: 0,
                    };
                    self.ticks = 0;
                }
                None
            }
            Phase::Burst { lit: false, blinks } => {
                if self.ticks < OFF_TICKS {
                    return None;
                }
                self.ticks = 0;
                self.phase = Phase::Burst {
                    lit: true,
                    blinks: blinks.saturating_add(1),
                };
                Some(true)
            }
            Phase::Burst { lit: true, blinks } => {
                if self.ticks < ON_TICKS {
                    return None;
                }
                self.ticks = 0;
                self.phase = if u16::from(blinks) > u16::from(snapshot.cycle) {
                    Phase::Waiting
                } else {
                    Phase::Burst { lit: false, blinks }
                };
                Some(false)
            }
        }
    }
}

impl Default for StatusBlinker {
    fn default() -> Self {
        Self::new()
    }
}

/// Status LED on a GPIO pin
pub struct StatusIndicator<P> {
    pin: P,
    blinker: StatusBlinker,
}

impl<P: OutputPin> StatusIndicator<P> {
    /// Drive `pin`, which should start low
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            blinker: StatusBlinker::new(),
        }
    }

    /// Advance one tick and drive the pin if the level changed
    pub fn tick(&mut self, progress: &HarnessProgress) -> Result<(), P::Error> {
        match self.blinker.tick(progress) {
            Some(true) => self.pin.set_high(),
            Some(false) => self.pin.set_low(),
            None => Ok(()),
        }
    }

    /// Give back the pin
    pub fn release(self) -> P {
        self.pin
    }
}
