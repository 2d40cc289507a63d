//! CH32V003 Low-Power Sleep Driver
//!
//! Puts the part into sleep or standby for an arbitrary duration, waking on a
//! countdown, an edge on one external pin, or whichever comes first.
//!
//! # Architecture
//!
//! ```text
//! Application (init / configure_* / sleep_for)
//!         ↓
//! SleepDriver (driver: validation, phase tracking)
//!         ↓
//! CyclePlanner (decompose: duration → countdown-sized cycles)
//!         ↓
//! run_cycle (executor: arm → clear → halt → restore)
//!         ↓
//! Platform traits (Countdown, WakeController)
//!         ↓
//! Register backend (hal, `hardware` feature) / platform mocks
//! ```
//!
//! A countdown covers at most `max_count` ticks per cycle (2.016 s on the
//! AWU). Longer requests are split into full cycles plus one remainder cycle;
//! in [`SleepMode::Both`] a pin edge ends the sequence early.
//!
//! # Features
//!
//! - `hardware` - CH32V003 register backend (`hal::ch32v003`, via the `ch32v0` PAC)
//! - `defmt` - Log through defmt and derive `defmt::Format`
//! - `std` - Standard library support (host tests)
//!
//! # Example
//!
//! ```ignore
//! use ch32_sleep::hal::{Awu, Ch32v003, WAKE_SOURCE};
//! use ch32_sleep::{SleepDriver, SleepMode, WakePin};
//! use embassy_time::Duration;
//!
//! let mut driver = SleepDriver::new(Awu::new(), Ch32v003::new(system_init), &WAKE_SOURCE);
//! driver.init(Some(WakePin::PA2))?;
//! driver.sleep_for(Duration::from_secs(5), SleepMode::Both)?;
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no unwrap() calls in production code
#![deny(clippy::expect_used)] // no expect() calls in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::new_without_default)] // peripherals are taken, not defaulted

// Must come first so the logging macros are visible to every module below.
mod fmt;

pub mod config;
pub mod decompose;
pub mod driver;
pub mod error;
pub mod executor;

pub mod hal;

pub use config::{ArmedPin, SleepRequest, WakeConfig, DEFAULT_EDGE};
pub use decompose::{continues_after, CyclePlan, CyclePlanner};
pub use driver::{SleepDriver, SleepPhase};
pub use error::SleepError;
pub use executor::run_cycle;

pub use platform::{
    Countdown, CountdownTiming, HalError, InterruptMode, SleepDepth, SleepMode, WakeController,
    WakeMethod, WakePin, WakeSource, WakeSourceCell, AWU_LSI_128K_DIV4096, TIM1_HCLK_48M_1KHZ,
};
