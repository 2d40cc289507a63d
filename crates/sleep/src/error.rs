//! Driver error type

use platform::{HalError, InvalidPin};
use thiserror_no_std::Error;

/// Why a driver call was rejected or failed.
///
/// Every variant except [`SleepError::Hal`] is raised before any hardware
/// register is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepError {
    /// `init` has not completed
    #[error("sleep driver is not initialised")]
    NotInitialized,
    /// The pin identifier is not a supported wake pin
    #[error("pin identifier {0:#04x} is not a supported wake pin")]
    InvalidPin(u8),
    /// The mode needs an external wake pin and none is configured
    #[error("no wake pin configured for an interrupt wake mode")]
    NoInterruptPin,
    /// Zero duration with a mode that arms the countdown
    #[error("sleep duration is zero for a timer wake mode")]
    TooShort,
    /// The backend failed
    #[error("hardware error: {0}")]
    Hal(HalError),
}

impl From<HalError> for SleepError {
    fn from(err: HalError) -> Self {
        Self::Hal(err)
    }
}

impl From<InvalidPin> for SleepError {
    fn from(err: InvalidPin) -> Self {
        Self::InvalidPin(err.id)
    }
}
