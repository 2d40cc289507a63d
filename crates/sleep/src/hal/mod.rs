//! Register backends.
//!
//! [`fields`] computes register words and is always built, so its layout
//! tests run on the host. The CH32V003 backend itself needs the `hardware`
//! feature and the PAC.

pub mod fields;

#[cfg(feature = "hardware")]
pub mod ch32v003;

#[cfg(feature = "hardware")]
pub use ch32v003::{
    on_awu_interrupt, on_pin_interrupt, on_tim1_update_interrupt, Awu, Ch32v003, Tim1,
    WAKE_SOURCE,
};
