//! Hardware Abstraction Layer (HAL) for the CH32V003 sleep driver
//!
//! This crate provides the value types and trait abstractions the sleep
//! driver programs, enabling development and testing without the part.
//!
//! # Architecture Layers
//!
//! ```text
//! Application
//!         ↓
//! Sleep driver (ch32-sleep: decomposition, arbitration, validation)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Register backend (ch32-sleep `hardware` feature) / mocks
//! ```
//!
//! # Modules
//!
//! - [`gpio`] - Wake-pin identifiers and the pin → EXTI line table
//! - [`power`] - [`Countdown`] and [`WakeController`] traits, sleep modes
//! - [`wake`] - Interrupt-to-foreground wake-source cell
//! - [`clock_config`] - Countdown timing profiles
//! - `mocks` - Recording mocks (`std` feature or tests)
//!
//! # Features
//!
//! - `std`: Enable standard library support and the mocks
//! - `defmt`: Enable defmt::Format derives on all platform types

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod clock_config;
pub mod gpio;
pub mod mocks;
pub mod power;
pub mod wake;

pub use clock_config::{CountdownTiming, AWU_LSI_128K_DIV4096, TIM1_HCLK_48M_1KHZ};
pub use gpio::{ExtiLine, InterruptMode, InvalidPin, PinMapping, Port, Pull, WakePin};
pub use power::{Countdown, HalError, SleepDepth, SleepMode, WakeController, WakeMethod};
pub use wake::{WakeSource, WakeSourceCell};
