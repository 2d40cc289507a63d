//! Countdown timing profiles for the CH32V003.
//!
//! A countdown peripheral decrements a programmed count at
//! `clock_hz / prescaler`. The width of its count register bounds how long a
//! single low-power cycle can last:
//!
//! ```text
//! time_per_count = prescaler / clock_hz
//! T_max          = max_count × time_per_count
//! ```
//!
//! All conversions below are integer microsecond arithmetic so they behave
//! the same on the MCU (no FPU) and on the host.
//!
//! # Sources
//!
//! - CH32V003 Reference Manual V1.x, §2.3.3 (auto-wakeup: LSI, AWUPSC, 6-bit AWUWR)
//! - CH32V003 Reference Manual V1.x, §10 (TIM1 16-bit auto-reload)

use embassy_time::Duration;

const MICROS_PER_SECOND: u128 = 1_000_000;

/// Fixed timing of one countdown peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CountdownTiming {
    /// Input clock frequency in Hz
    pub clock_hz: u32,
    /// Fixed prescaler between the clock and the counter
    pub prescaler: u32,
    /// Largest count the counter register can hold
    pub max_count: u32,
    /// Smallest count the counter can be armed with
    pub min_count: u32,
}

impl CountdownTiming {
    /// Create a timing profile.
    pub const fn new(clock_hz: u32, prescaler: u32, max_count: u32) -> Self {
        Self {
            clock_hz,
            prescaler,
            max_count,
            min_count: 1,
        }
    }

    /// Raise the smallest armable count.
    pub const fn with_min_count(self, min_count: u32) -> Self {
        Self { min_count, ..self }
    }

    /// Whether `count` can be programmed into the counter.
    pub fn accepts(&self, count: u32) -> bool {
        count >= self.min_count.max(1) && count <= self.max_count
    }

    /// Wall-time covered by `count` counter ticks, rounded down to a microsecond.
    pub fn duration_of(&self, count: u32) -> Duration {
        let num = u128::from(count)
            .saturating_mul(u128::from(self.prescaler))
            .saturating_mul(MICROS_PER_SECOND);
        let micros = num.checked_div(u128::from(self.clock_hz)).unwrap_or(0);
        Duration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
    }

    /// Duration of a single counter tick.
    pub fn time_per_count(&self) -> Duration {
        self.duration_of(1)
    }

    /// Longest duration a single cycle can cover (`T_max`).
    pub fn max_cycle(&self) -> Duration {
        self.duration_of(self.max_count)
    }

    /// Number of counter ticks closest to `duration` (half rounds up).
    ///
    /// Not clamped to `max_count`; a long duration needs several cycles.
    pub fn counts_for(&self, duration: Duration) -> u64 {
        let num = u128::from(duration.as_micros()).saturating_mul(u128::from(self.clock_hz));
        let den = u128::from(self.prescaler).saturating_mul(MICROS_PER_SECOND);
        let rounded = num
            .saturating_add(den / 2)
            .checked_div(den)
            .unwrap_or(0);
        u64::try_from(rounded).unwrap_or(u64::MAX)
    }
}

/// Auto-wakeup unit on the LSI: 128 kHz / 4096 → 32 ms per count, 6-bit
/// window (63 counts) → 2.016 s per cycle.
pub const AWU_LSI_128K_DIV4096: CountdownTiming = CountdownTiming::new(128_000, 4096, 63);

/// TIM1 on HCLK: 48 MHz / 48 000 → 1 ms per count, 16-bit auto-reload.
///
/// An update fires after `ATRLR + 1` ticks and `ATRLR = 0` stalls the
/// counter, so the shortest cycle is two ticks.
pub const TIM1_HCLK_48M_1KHZ: CountdownTiming =
    CountdownTiming::new(48_000_000, 48_000, 65_535).with_min_count(2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awu_tick_is_32_ms() {
        assert_eq!(AWU_LSI_128K_DIV4096.time_per_count(), Duration::from_millis(32));
    }

    #[test]
    fn awu_cycle_is_2016_ms() {
        assert_eq!(AWU_LSI_128K_DIV4096.max_cycle(), Duration::from_millis(2016));
    }

    #[test]
    fn tim1_tick_is_1_ms() {
        assert_eq!(TIM1_HCLK_48M_1KHZ.time_per_count(), Duration::from_millis(1));
        assert_eq!(TIM1_HCLK_48M_1KHZ.max_cycle(), Duration::from_millis(65_535));
    }

    #[test]
    fn counts_round_half_up() {
        let awu = AWU_LSI_128K_DIV4096;
        // 1 s / 32 ms = 31.25
        assert_eq!(awu.counts_for(Duration::from_secs(1)), 31);
        // 2 s / 32 ms = 62.5
        assert_eq!(awu.counts_for(Duration::from_secs(2)), 63);
        // 16 ms is exactly half a tick
        assert_eq!(awu.counts_for(Duration::from_millis(16)), 1);
        assert_eq!(awu.counts_for(Duration::from_millis(15)), 0);
    }

    #[test]
    fn degenerate_profile_does_not_divide_by_zero() {
        let broken = CountdownTiming::new(0, 0, 0);
        assert_eq!(broken.counts_for(Duration::from_secs(1)), 0);
        assert_eq!(broken.time_per_count(), Duration::from_micros(0));
    }

    #[test]
    fn armable_range() {
        assert!(!AWU_LSI_128K_DIV4096.accepts(0));
        assert!(AWU_LSI_128K_DIV4096.accepts(1));
        assert!(AWU_LSI_128K_DIV4096.accepts(63));
        assert!(!AWU_LSI_128K_DIV4096.accepts(64));
        assert!(!TIM1_HCLK_48M_1KHZ.accepts(1));
        assert!(TIM1_HCLK_48M_1KHZ.accepts(2));
        assert!(TIM1_HCLK_48M_1KHZ.accepts(65_535));
    }
}
