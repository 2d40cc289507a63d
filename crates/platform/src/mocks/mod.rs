//! Mock implementations for testing
//!
//! [`MockCountdown`] and [`MockWakeController`] append every hardware call to
//! a shared [`MockJournal`], so tests can assert on the exact order of
//! register-level operations across both devices. The controller's
//! [`halt`](WakeController::halt) plays the part of the interrupt handler: it
//! records a scripted [`WakeSource`] into the wake cell.

#![cfg(any(test, feature = "std"))]

use std::boxed::Box;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use crate::clock_config::CountdownTiming;
use crate::gpio::{ExtiLine, InterruptMode, PinMapping};
use crate::power::{Countdown, HalError, SleepDepth, WakeController};
use crate::wake::{WakeSource, WakeSourceCell};

/// One hardware operation seen by a mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalCall {
    /// [`Countdown::enable`]
    CountdownEnable,
    /// [`Countdown::arm`]
    CountdownArm(u32),
    /// [`Countdown::disarm`]
    CountdownDisarm,
    /// [`Countdown::clear_pending`]
    CountdownClearPending,
    /// [`WakeController::select_depth`]
    SelectDepth(SleepDepth),
    /// [`WakeController::arm_pin`]
    ArmPin(PinMapping, InterruptMode),
    /// [`WakeController::disarm_pin`]
    DisarmPin(PinMapping),
    /// [`WakeController::clear_pending`]
    ClearPinPending(ExtiLine),
    /// [`WakeController::halt`]; carries the cell value seen on entry
    Halt(WakeSource),
    /// [`WakeController::restore_clocks`]
    RestoreClocks,
}

/// Ordered record of hardware calls shared between mocks.
#[derive(Clone, Default)]
pub struct MockJournal {
    calls: Rc<RefCell<Vec<HalCall>>>,
}

impl MockJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: HalCall) {
        self.calls.borrow_mut().push(call);
    }

    /// Snapshot of all calls so far
    pub fn calls(&self) -> Vec<HalCall> {
        self.calls.borrow().clone()
    }

    /// Whether no call has been made
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    /// Number of halts executed
    pub fn halts(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, HalCall::Halt(_)))
            .count()
    }

    /// Counts programmed into the countdown, in order
    pub fn armed_counts(&self) -> Vec<u32> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                HalCall::CountdownArm(count) => Some(*count),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

/// Mock countdown
pub struct MockCountdown {
    timing: CountdownTiming,
    depth: SleepDepth,
    journal: MockJournal,
    enable_error: Option<HalError>,
}

impl MockCountdown {
    /// Create a mock countdown with the given timing, keeping standby depth
    pub fn new(timing: CountdownTiming, journal: MockJournal) -> Self {
        Self {
            timing,
            depth: SleepDepth::Standby,
            journal,
            enable_error: None,
        }
    }

    /// Report a different halt depth
    pub fn with_depth(mut self, depth: SleepDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Make [`Countdown::enable`] fail with `error`
    pub fn failing_enable(mut self, error: HalError) -> Self {
        self.enable_error = Some(error);
        self
    }
}

impl Countdown for MockCountdown {
    fn timing(&self) -> CountdownTiming {
        self.timing
    }

    fn depth(&self) -> SleepDepth {
        self.depth
    }

    fn enable(&mut self) -> Result<(), HalError> {
        if let Some(error) = self.enable_error {
            return Err(error);
        }
        self.journal.push(HalCall::CountdownEnable);
        Ok(())
    }

    fn arm(&mut self, count: u32) -> Result<(), HalError> {
        if !self.timing.accepts(count) {
            return Err(HalError::CountOutOfRange { count });
        }
        self.journal.push(HalCall::CountdownArm(count));
        Ok(())
    }

    fn disarm(&mut self) -> Result<(), HalError> {
        self.journal.push(HalCall::CountdownDisarm);
        Ok(())
    }

    fn clear_pending(&mut self) -> Result<(), HalError> {
        self.journal.push(HalCall::CountdownClearPending);
        Ok(())
    }
}

/// Mock wake controller with a scripted interrupt sequence
pub struct MockWakeController {
    cell: &'static WakeSourceCell,
    journal: MockJournal,
    script: VecDeque<WakeSource>,
    fallback: WakeSource,
    arm_failure: Option<(ExtiLine, HalError)>,
}

impl MockWakeController {
    /// Create a controller that reports a timer wake on every halt
    pub fn new(cell: &'static WakeSourceCell, journal: MockJournal) -> Self {
        Self {
            cell,
            journal,
            script: VecDeque::new(),
            fallback: WakeSource::Timer,
            arm_failure: None,
        }
    }

    /// Wake sources to fire on successive halts; after the script runs out
    /// every halt fires the fallback
    pub fn with_script<I: IntoIterator<Item = WakeSource>>(mut self, script: I) -> Self {
        self.script = script.into_iter().collect();
        self
    }

    /// Source fired once the script is exhausted
    pub fn with_fallback(mut self, source: WakeSource) -> Self {
        self.fallback = source;
        self
    }

    /// Make [`WakeController::arm_pin`] fail with `error` for pins on `line`
    pub fn failing_arm_on(mut self, line: ExtiLine, error: HalError) -> Self {
        self.arm_failure = Some((line, error));
        self
    }
}

impl WakeController for MockWakeController {
    fn select_depth(&mut self, depth: SleepDepth) -> Result<(), HalError> {
        self.journal.push(HalCall::SelectDepth(depth));
        Ok(())
    }

    fn arm_pin(&mut self, pin: PinMapping, mode: InterruptMode) -> Result<(), HalError> {
        if let Some((line, error)) = self.arm_failure {
            if line == pin.line {
                return Err(error);
            }
        }
        self.journal.push(HalCall::ArmPin(pin, mode));
        Ok(())
    }

    fn disarm_pin(&mut self, pin: PinMapping) -> Result<(), HalError> {
        self.journal.push(HalCall::DisarmPin(pin));
        Ok(())
    }

    fn clear_pending(&mut self, line: ExtiLine) -> Result<(), HalError> {
        self.journal.push(HalCall::ClearPinPending(line));
        Ok(())
    }

    fn halt(&mut self) {
        self.journal.push(HalCall::Halt(self.cell.read()));
        let source = self.script.pop_front().unwrap_or(self.fallback);
        self.cell.record(source);
    }

    fn restore_clocks(&mut self) {
        self.journal.push(HalCall::RestoreClocks);
    }
}

/// A fresh wake cell with `'static` lifetime, one per test.
pub fn leak_wake_cell() -> &'static WakeSourceCell {
    Box::leak(Box::new(WakeSourceCell::new()))
}
