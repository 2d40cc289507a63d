//! Driver configuration constants and the wake configuration state.
//!
//! [`WakeConfig`] holds what `init`/`configure_*` have set up and decides
//! whether a [`SleepRequest`] can be served. It never touches hardware; the
//! driver arms pins only after the configuration accepted them.

use embassy_time::Duration;
use platform::{InterruptMode, PinMapping, SleepMode, WakeMethod, WakePin};

use crate::error::SleepError;

/// Edge used by `configure_pin` and `init`: buttons pull the line low.
pub const DEFAULT_EDGE: InterruptMode = InterruptMode::FallingEdge;

/// Polls of RSTSCKR.LSIRDY before giving up on the low-speed oscillator.
/// LSI starts in well under 100 µs; at 48 MHz this allows several ms.
pub const LSI_READY_SPIN_LIMIT: u32 = 100_000;

/// A single call to sleep: how long and on what to wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepRequest {
    /// Requested duration; ignored in [`SleepMode::Interrupt`]
    pub duration: Duration,
    /// Wake mode
    pub mode: SleepMode,
}

impl SleepRequest {
    /// Create a request
    pub const fn new(duration: Duration, mode: SleepMode) -> Self {
        Self { duration, mode }
    }
}

/// A wake pin that has been validated and armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmedPin {
    /// Logical identifier
    pub pin: WakePin,
    /// Resolved port/pin/line
    pub mapping: PinMapping,
    /// Edge selection
    pub mode: InterruptMode,
}

/// Currently configured wake sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WakeConfig {
    initialized: bool,
    timer: Option<Duration>,
    pin: Option<ArmedPin>,
}

impl WakeConfig {
    /// Uninitialised, nothing armed
    pub const fn new() -> Self {
        Self {
            initialized: false,
            timer: None,
            pin: None,
        }
    }

    /// Whether `init` has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Configured timer duration, if any
    pub fn timer(&self) -> Option<Duration> {
        self.timer
    }

    /// Configured wake pin, if any
    pub fn pin(&self) -> Option<ArmedPin> {
        self.pin
    }

    /// Replace the timer duration. The pin is left alone.
    pub fn set_timer(&mut self, duration: Duration) {
        self.timer = Some(duration);
    }

    /// Drop the timer duration.
    pub fn clear_timer(&mut self) {
        self.timer = None;
    }

    /// Replace the wake pin, returning the one it displaced.
    pub fn set_pin(&mut self, pin: ArmedPin) -> Option<ArmedPin> {
        self.pin.replace(pin)
    }

    /// Drop the wake pin, returning it.
    pub fn clear_pin(&mut self) -> Option<ArmedPin> {
        self.pin.take()
    }

    /// Wake method implied by what is configured.
    pub fn method(&self) -> WakeMethod {
        match (self.timer, self.pin) {
            (None, None) => WakeMethod::None,
            (Some(_), None) => WakeMethod::Timer,
            (None, Some(armed)) => WakeMethod::ExternalSignal { pin: armed.pin },
            (Some(_), Some(armed)) => WakeMethod::Both { pin: armed.pin },
        }
    }

    /// Check that `request` can be served.
    ///
    /// Checked in order: initialisation, wake pin, duration.
    pub fn validate(&self, request: SleepRequest) -> Result<(), SleepError> {
        if !self.initialized {
            return Err(SleepError::NotInitialized);
        }
        if request.mode.needs_pin() && self.pin.is_none() {
            return Err(SleepError::NoInterruptPin);
        }
        if request.duration == Duration::from_ticks(0) && request.mode != SleepMode::Interrupt {
            return Err(SleepError::TooShort);
        }
        Ok(())
    }

    /// The request that sleeping on the configured method amounts to.
    pub fn request_for_method(&self) -> Result<SleepRequest, SleepError> {
        if !self.initialized {
            return Err(SleepError::NotInitialized);
        }
        match (self.timer, self.pin) {
            (None, None) => Err(SleepError::NotInitialized),
            (Some(duration), None) => Ok(SleepRequest::new(duration, SleepMode::Timer)),
            (None, Some(_)) => Ok(SleepRequest::new(
                Duration::from_ticks(0),
                SleepMode::Interrupt,
            )),
            (Some(duration), Some(_)) => Ok(SleepRequest::new(duration, SleepMode::Both)),
        }
    }
}
