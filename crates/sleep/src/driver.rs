//! The sleep driver façade.
//!
//! # Lifecycle
//!
//! ```text
//! Idle → Validating ─┬→ Error
//!                    └→ Decomposing → ArmingCycle → Halted → Woken ─┬→ Decomposing
//!                                                                   └→ Done
//! ```
//!
//! Every rejection happens in `Validating`, before any register write.

use embassy_time::Duration;
use platform::{
    Countdown, ExtiLine, InterruptMode, SleepMode, WakeController, WakeMethod, WakePin,
    WakeSource, WakeSourceCell,
};

use crate::config::{ArmedPin, SleepRequest, WakeConfig, DEFAULT_EDGE};
use crate::decompose::{continues_after, CyclePlan, CyclePlanner};
use crate::error::SleepError;
use crate::executor::run_cycle;

/// Where the driver is in a sleep call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepPhase {
    /// No sleep call has run yet
    Idle,
    /// Checking the request against the configuration
    Validating,
    /// Choosing the next cycle
    Decomposing,
    /// Programming countdown and clearing stale flags
    ArmingCycle,
    /// Halted, waiting for an interrupt
    Halted,
    /// Back from halt, wake source available
    Woken,
    /// The last call completed
    Done,
    /// The last call was rejected or failed
    Error,
}

/// Low-power sleep driver over a countdown `C` and a wake controller `W`.
///
/// `wake` is the cell the interrupt handlers record into; on hardware it is
/// the backend's static, in tests a mock controller fires into it.
pub struct SleepDriver<C, W> {
    countdown: C,
    controller: W,
    wake: &'static WakeSourceCell,
    config: WakeConfig,
    phase: SleepPhase,
}

impl<C, W> SleepDriver<C, W>
where
    C: Countdown,
    W: WakeController,
{
    /// Create an uninitialised driver. No hardware is touched until
    /// [`init`](Self::init).
    pub fn new(countdown: C, controller: W, wake: &'static WakeSourceCell) -> Self {
        Self {
            countdown,
            controller,
            wake,
            config: WakeConfig::new(),
            phase: SleepPhase::Idle,
        }
    }

    /// Bring up the countdown and power-mode selection, then optionally arm
    /// a wake pin on the falling edge.
    ///
    /// Calling `init` again skips the countdown bring-up but still applies
    /// `pin`.
    pub fn init(&mut self, pin: Option<WakePin>) -> Result<(), SleepError> {
        if !self.config.is_initialized() {
            self.countdown.enable()?;
            self.controller.select_depth(self.countdown.depth())?;
            self.config.mark_initialized();
            info!("sleep driver initialised");
        }
        match pin {
            Some(pin) => self.configure_pin(pin),
            None => Ok(()),
        }
    }

    /// Arm `pin` as the wake pin, falling edge with pull-up.
    pub fn configure_pin(&mut self, pin: WakePin) -> Result<(), SleepError> {
        self.configure_external(pin, DEFAULT_EDGE)
    }

    /// Arm `pin` as the wake pin on `mode`, replacing any previous pin.
    ///
    /// An unsupported identifier is rejected before any hardware access and
    /// leaves the configuration as it was.
    pub fn configure_external(
        &mut self,
        pin: WakePin,
        mode: InterruptMode,
    ) -> Result<(), SleepError> {
        if !self.config.is_initialized() {
            return Err(SleepError::NotInitialized);
        }
        let mapping = pin.resolve().map_err(|err| {
            warn!("rejected wake pin {=u8:#x}", err.id);
            SleepError::from(err)
        })?;

        self.controller.arm_pin(mapping, mode)?;
        let previous = self.config.set_pin(ArmedPin { pin, mapping, mode });
        if let Some(previous) = previous {
            if previous.mapping.line != mapping.line {
                self.controller.disarm_pin(previous.mapping)?;
            }
        }
        debug!(
            "wake pin {=u8:#x} armed on line {=u8}",
            pin.id(),
            mapping.line.number()
        );
        Ok(())
    }

    /// Set the duration [`sleep`](Self::sleep) uses. The wake pin is kept.
    pub fn configure_timer(&mut self, duration: Duration) -> Result<(), SleepError> {
        if !self.config.is_initialized() {
            return Err(SleepError::NotInitialized);
        }
        self.config.set_timer(duration);
        Ok(())
    }

    /// Forget the configured timer duration.
    pub fn clear_timer(&mut self) {
        self.config.clear_timer();
    }

    /// Mask and forget the wake pin.
    pub fn release_pin(&mut self) -> Result<(), SleepError> {
        if let Some(armed) = self.config.pin() {
            self.controller.disarm_pin(armed.mapping)?;
            self.config.clear_pin();
        }
        Ok(())
    }

    /// Sleep for `duration`, waking according to `mode`.
    ///
    /// - `Timer`: sleeps the whole duration, in as many cycles as needed.
    /// - `Interrupt`: one cycle with no countdown; `duration` is ignored.
    /// - `Both`: stops at the first cycle not ended by the countdown.
    pub fn sleep_for(&mut self, duration: Duration, mode: SleepMode) -> Result<(), SleepError> {
        let result = self.run(SleepRequest::new(duration, mode));
        self.phase = match result {
            Ok(()) => SleepPhase::Done,
            Err(_) => SleepPhase::Error,
        };
        result
    }

    /// Sleep on whatever [`wake_method`](Self::wake_method) is configured.
    pub fn sleep(&mut self) -> Result<(), SleepError> {
        match self.config.request_for_method() {
            Ok(request) => self.sleep_for(request.duration, request.mode),
            Err(err) => {
                self.phase = SleepPhase::Error;
                Err(err)
            }
        }
    }

    fn run(&mut self, request: SleepRequest) -> Result<(), SleepError> {
        self.phase = SleepPhase::Validating;
        if let Err(err) = self.config.validate(request) {
            warn!("sleep request rejected: {}", err);
            return Err(err);
        }
        debug!(
            "sleep {=u64} ms, mode {}",
            request.duration.as_millis(),
            request.mode
        );

        let pin_line = self.config.pin().map(|armed| armed.mapping.line);

        if request.mode == SleepMode::Interrupt {
            self.phase = SleepPhase::ArmingCycle;
            self.cycle(None, pin_line)?;
            return Ok(());
        }

        self.phase = SleepPhase::Decomposing;
        let planner = CyclePlanner::new(request.duration, self.countdown.timing());
        trace!("{=u64} cycles planned", planner.cycles_left());
        for plan in planner {
            self.phase = SleepPhase::ArmingCycle;
            self.cycle(Some(&plan), pin_line)?;
            let source = self.wake.read();
            if !continues_after(request.mode, source) {
                debug!("woken early by {}", source);
                break;
            }
            self.phase = SleepPhase::Decomposing;
        }
        Ok(())
    }

    fn cycle(
        &mut self,
        plan: Option<&CyclePlan>,
        pin_line: Option<ExtiLine>,
    ) -> Result<(), SleepError> {
        self.phase = SleepPhase::Halted;
        run_cycle(
            &mut self.countdown,
            &mut self.controller,
            self.wake,
            plan,
            pin_line,
        )?;
        self.phase = SleepPhase::Woken;
        Ok(())
    }

    /// What woke the core from the last cycle.
    pub fn last_wake_source(&self) -> WakeSource {
        self.wake.read()
    }

    /// Whether a wake has been recorded since the last cycle was armed or
    /// [`reset_wake_source`](Self::reset_wake_source) was called.
    pub fn is_awake(&self) -> bool {
        self.wake.has_woken()
    }

    /// Forget the last wake source.
    pub fn reset_wake_source(&self) {
        self.wake.reset();
    }

    /// Wake method implied by the current configuration.
    pub fn wake_method(&self) -> WakeMethod {
        self.config.method()
    }

    /// Current configuration.
    pub fn config(&self) -> &WakeConfig {
        &self.config
    }

    /// Phase reached by the last call.
    pub fn phase(&self) -> SleepPhase {
        self.phase
    }

    /// Give the peripherals back.
    pub fn release(self) -> (C, W) {
        (self.countdown, self.controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::mocks::{
        leak_wake_cell, HalCall, MockCountdown, MockJournal, MockWakeController,
    };
    use platform::{HalError, SleepDepth, AWU_LSI_128K_DIV4096};

    type MockDriver = SleepDriver<MockCountdown, MockWakeController>;

    fn driver(script: &[WakeSource]) -> (MockDriver, MockJournal) {
        let journal = MockJournal::new();
        let cell = leak_wake_cell();
        let countdown = MockCountdown::new(AWU_LSI_128K_DIV4096, journal.clone());
        let controller =
            MockWakeController::new(cell, journal.clone()).with_script(script.iter().copied());
        (SleepDriver::new(countdown, controller, cell), journal)
    }

    #[test]
    fn init_enables_countdown_then_selects_standby() {
        let (mut drv, journal) = driver(&[]);
        assert_eq!(drv.init(None), Ok(()));
        assert_eq!(
            journal.calls(),
            [
                HalCall::CountdownEnable,
                HalCall::SelectDepth(SleepDepth::Standby)
            ]
        );
        assert_eq!(drv.phase(), SleepPhase::Idle);
    }

    #[test]
    fn second_init_only_applies_the_pin() {
        let (mut drv, journal) = driver(&[]);
        assert_eq!(drv.init(None), Ok(()));
        journal.clear();
        assert_eq!(drv.init(Some(WakePin::PD6)), Ok(()));
        assert_eq!(journal.calls().len(), 1);
        assert!(matches!(journal.calls().first(), Some(HalCall::ArmPin(_, _))));
    }

    #[test]
    fn replacing_a_pin_on_another_line_masks_the_old_line() {
        let (mut drv, journal) = driver(&[]);
        assert_eq!(drv.init(Some(WakePin::PA2)), Ok(()));
        journal.clear();
        assert_eq!(drv.configure_external(WakePin::PD6, InterruptMode::RisingEdge), Ok(()));

        let pa2 = WakePin::PA2.resolve();
        let pd6 = WakePin::PD6.resolve();
        let calls = journal.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            pd6.map(|m| HalCall::ArmPin(m, InterruptMode::RisingEdge))
                .ok()
                .as_ref(),
            calls.first()
        );
        assert_eq!(pa2.map(HalCall::DisarmPin).ok().as_ref(), calls.get(1));
    }

    #[test]
    fn failed_arm_keeps_the_previous_pin_live() {
        let journal = MockJournal::new();
        let cell = leak_wake_cell();
        let countdown = MockCountdown::new(AWU_LSI_128K_DIV4096, journal.clone());
        let line6 = ExtiLine::new(6).unwrap_or(ExtiLine::AWU);
        let controller = MockWakeController::new(cell, journal.clone())
            .failing_arm_on(line6, HalError::ClockNotReady);
        let mut drv = SleepDriver::new(countdown, controller, cell);
        assert_eq!(drv.init(Some(WakePin::PA2)), Ok(()));
        journal.clear();

        assert_eq!(
            drv.configure_pin(WakePin::PD6),
            Err(SleepError::Hal(HalError::ClockNotReady))
        );
        assert!(journal.is_empty());
        assert_eq!(
            drv.wake_method(),
            WakeMethod::ExternalSignal { pin: WakePin::PA2 }
        );
    }

    #[test]
    fn same_line_is_rerouted_without_masking() {
        let (mut drv, journal) = driver(&[]);
        assert_eq!(drv.init(Some(WakePin::PA2)), Ok(()));
        journal.clear();
        assert_eq!(drv.configure_pin(WakePin::PC2), Ok(()));
        assert_eq!(journal.calls().len(), 1);
    }

    #[test]
    fn phase_is_error_after_rejection() {
        let (mut drv, _) = driver(&[]);
        assert_eq!(drv.init(None), Ok(()));
        assert_eq!(
            drv.sleep_for(Duration::from_secs(1), SleepMode::Both),
            Err(SleepError::NoInterruptPin)
        );
        assert_eq!(drv.phase(), SleepPhase::Error);
    }

    #[test]
    fn phase_is_done_after_sleep() {
        let (mut drv, _) = driver(&[]);
        assert_eq!(drv.init(None), Ok(()));
        assert_eq!(drv.sleep_for(Duration::from_secs(1), SleepMode::Timer), Ok(()));
        assert_eq!(drv.phase(), SleepPhase::Done);
        assert_eq!(drv.last_wake_source(), WakeSource::Timer);
    }

    #[test]
    fn sleep_without_configured_method_is_rejected() {
        let (mut drv, journal) = driver(&[]);
        assert_eq!(drv.init(None), Ok(()));
        journal.clear();
        assert_eq!(drv.sleep(), Err(SleepError::NotInitialized));
        assert!(journal.is_empty());
    }

    #[test]
    fn release_pin_masks_and_forgets() {
        let (mut drv, journal) = driver(&[]);
        assert_eq!(drv.init(Some(WakePin::PC4)), Ok(()));
        journal.clear();
        assert_eq!(drv.release_pin(), Ok(()));
        assert_eq!(journal.calls().len(), 1);
        assert_eq!(drv.wake_method(), WakeMethod::None);
        // Nothing left to release.
        assert_eq!(drv.release_pin(), Ok(()));
        assert_eq!(journal.calls().len(), 1);
    }

    #[test]
    fn reset_wake_source_clears_awake_flag() {
        let (mut drv, _) = driver(&[WakeSource::ExternalSignal]);
        assert_eq!(drv.init(Some(WakePin::PD4)), Ok(()));
        assert_eq!(drv.sleep_for(Duration::from_secs(0), SleepMode::Interrupt), Ok(()));
        assert!(drv.is_awake());
        drv.reset_wake_source();
        assert!(!drv.is_awake());
        assert_eq!(drv.last_wake_source(), WakeSource::Unknown);
    }
}
