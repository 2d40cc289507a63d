//! Splitting a long sleep into countdown-sized cycles.
//!
//! A countdown can only cover `T_max = max_count × time_per_count` per cycle.
//! While at least `T_max` remains, a cycle programs `max_count`; the rest of
//! the request goes into one final cycle, rounded to the nearest tick and
//! never below the countdown's smallest count. Remaining time is reduced by
//! what each cycle covered, so a request of `D` takes `ceil(D / T_max)`
//! cycles.

use embassy_time::Duration;
use platform::{CountdownTiming, SleepMode, WakeSource};

/// One armed countdown cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePlan {
    /// Value programmed into the countdown, in `min_count..=max_count`
    pub count: u32,
    /// Wall-time the count represents
    pub covered: Duration,
}

/// Iterator over the cycles needed to cover a duration.
#[derive(Debug, Clone)]
pub struct CyclePlanner {
    timing: CountdownTiming,
    remaining: Duration,
}

impl CyclePlanner {
    /// Plan `duration` on a countdown with `timing`.
    pub fn new(duration: Duration, timing: CountdownTiming) -> Self {
        let remaining = if timing.max_count > 0 && timing.max_cycle().as_ticks() > 0 {
            duration
        } else {
            Duration::from_ticks(0)
        };
        Self { timing, remaining }
    }

    /// Wall-time still to be covered.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Number of cycles left, `ceil(remaining / T_max)`.
    pub fn cycles_left(&self) -> u64 {
        self.remaining
            .as_ticks()
            .div_ceil(self.timing.max_cycle().as_ticks().max(1))
    }

    fn final_count(&self) -> u32 {
        let rounded = self.timing.counts_for(self.remaining);
        let floor = u64::from(self.timing.min_count.max(1));
        let count = rounded.clamp(floor, u64::from(self.timing.max_count));
        // clamped to max_count, which is a u32
        u32::try_from(count).unwrap_or(self.timing.max_count)
    }
}

impl Iterator for CyclePlanner {
    type Item = CyclePlan;

    fn next(&mut self) -> Option<CyclePlan> {
        if self.remaining.as_ticks() == 0 {
            return None;
        }
        let full = self.timing.max_cycle();
        let plan = if self.remaining >= full {
            let left = self.remaining.as_ticks().saturating_sub(full.as_ticks());
            self.remaining = Duration::from_ticks(left);
            CyclePlan {
                count: self.timing.max_count,
                covered: full,
            }
        } else {
            let count = self.final_count();
            self.remaining = Duration::from_ticks(0);
            CyclePlan {
                count,
                covered: self.timing.duration_of(count),
            }
        };
        Some(plan)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.cycles_left()).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

/// Whether a multi-cycle sleep keeps going after a cycle woken by `source`.
///
/// - `Timer`: never stops early; stray pin or unknown wakes are slept through.
/// - `Interrupt`: a single cycle, always stops.
/// - `Both`: keeps going only after a countdown expiry. A pin edge — or a
///   wake nobody claimed — ends the sleep.
pub fn continues_after(mode: SleepMode, source: WakeSource) -> bool {
    match mode {
        SleepMode::Timer => true,
        SleepMode::Interrupt => false,
        SleepMode::Both => source == WakeSource::Timer,
    }
}
