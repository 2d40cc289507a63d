//! Low-power abstraction
//!
//! Provides the interfaces the sleep driver programs: a countdown that can
//! wake the core and the controller that owns edge detection, power-mode
//! selection and the halt instruction.

use thiserror_no_std::Error;

use crate::clock_config::CountdownTiming;
use crate::gpio::{ExtiLine, InterruptMode, PinMapping, WakePin};

/// Depth of the low-power halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepDepth {
    /// Core clock gated, bus clocks running
    Sleep,
    /// Standby with wake sources retained (LSI, EXTI); HSI and PLL stop
    Standby,
}

/// Wake mode requested for a single sleep call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepMode {
    /// Wake after the requested duration
    Timer,
    /// Wake on the external pin only
    Interrupt,
    /// Wake on whichever comes first
    Both,
}

impl SleepMode {
    /// Whether a countdown is armed in this mode.
    pub const fn uses_timer(self) -> bool {
        matches!(self, Self::Timer | Self::Both)
    }

    /// Whether a wake pin must be configured for this mode.
    pub const fn needs_pin(self) -> bool {
        matches!(self, Self::Interrupt | Self::Both)
    }
}

/// Wake method currently armed by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeMethod {
    /// Nothing configured
    None,
    /// Countdown only
    Timer,
    /// External pin only
    ExternalSignal {
        /// The armed pin
        pin: WakePin,
    },
    /// Countdown and external pin
    Both {
        /// The armed pin
        pin: WakePin,
    },
}

/// Hardware-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// The countdown's clock source never reported ready
    #[error("countdown clock source did not become ready")]
    ClockNotReady,
    /// The countdown cannot represent the requested count
    #[error("count {count} is outside the countdown range")]
    CountOutOfRange {
        /// The rejected count
        count: u32,
    },
}

/// A hardware countdown able to wake the core from low-power halt.
pub trait Countdown {
    /// Fixed clock/prescaler/width of this countdown.
    fn timing(&self) -> CountdownTiming;

    /// Deepest halt the countdown keeps running in.
    fn depth(&self) -> SleepDepth {
        SleepDepth::Standby
    }

    /// One-time setup: clock source, prescaler, wake line, interrupt enable.
    fn enable(&mut self) -> Result<(), HalError>;

    /// Program `count` ticks (1..=`max_count`) and start counting.
    fn arm(&mut self, count: u32) -> Result<(), HalError>;

    /// Stop counting.
    fn disarm(&mut self) -> Result<(), HalError>;

    /// Clear a stale expiry flag so it cannot end the next halt early.
    fn clear_pending(&mut self) -> Result<(), HalError>;
}

/// Edge detection, power-mode selection and the halt instruction.
pub trait WakeController {
    /// Select the halt depth used by [`WakeController::halt`].
    fn select_depth(&mut self, depth: SleepDepth) -> Result<(), HalError>;

    /// Route `pin` to its EXTI line as a pulled input and enable the
    /// interrupt on the given edge. Re-arming the same pin is harmless.
    fn arm_pin(&mut self, pin: PinMapping, mode: InterruptMode) -> Result<(), HalError>;

    /// Mask the pin's EXTI line.
    fn disarm_pin(&mut self, pin: PinMapping) -> Result<(), HalError>;

    /// Clear a stale pending flag on `line`.
    fn clear_pending(&mut self, line: ExtiLine) -> Result<(), HalError>;

    /// Halt until any enabled interrupt is pending. Returns after its
    /// handler has run.
    fn halt(&mut self);

    /// Restore the clock tree the low-power state discarded.
    fn restore_clocks(&mut self);
}
