//! Wake-source hand-off from interrupt context to the foreground.
//!
//! One [`WakeSourceCell`] exists per system, normally as a `static`. The
//! countdown and pin interrupt handlers are its only writers; the sleep
//! driver is its only reader, and only reads after the halt instruction has
//! returned. The handler runs to completion before the foreground resumes,
//! so a release store paired with an acquire load is all the ordering needed.

use portable_atomic::{AtomicU8, Ordering};

/// What caused the most recent resumption from low-power halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WakeSource {
    /// Countdown expired
    Timer = 0,
    /// External pin edge
    ExternalSignal = 1,
    /// Nothing recorded since the last reset
    Unknown = 2,
}

impl WakeSource {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Timer,
            1 => Self::ExternalSignal,
            _ => Self::Unknown,
        }
    }
}

/// Single-slot mailbox holding the last [`WakeSource`].
pub struct WakeSourceCell {
    source: AtomicU8,
}

impl WakeSourceCell {
    /// A cell holding [`WakeSource::Unknown`].
    pub const fn new() -> Self {
        Self {
            source: AtomicU8::new(WakeSource::Unknown as u8),
        }
    }

    /// Record a wake source. Interrupt context only; never blocks.
    pub fn record(&self, source: WakeSource) {
        self.source.store(source as u8, Ordering::Release);
    }

    /// Last recorded source. Foreground only.
    pub fn read(&self) -> WakeSource {
        WakeSource::from_raw(self.source.load(Ordering::Acquire))
    }

    /// Forget the last source. Called before every cycle is armed.
    pub fn reset(&self) {
        self.record(WakeSource::Unknown);
    }

    /// Whether any wake has been recorded since the last reset.
    pub fn has_woken(&self) -> bool {
        self.read() != WakeSource::Unknown
    }
}

impl Default for WakeSourceCell {
    fn default() -> Self {
        Self::new()
    }
}
