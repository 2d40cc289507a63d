//! One arm → halt → resume cycle.

use platform::{Countdown, ExtiLine, HalError, WakeController, WakeSourceCell};

use crate::decompose::CyclePlan;

/// Run a single low-power cycle.
///
/// In order:
/// 1. reset the wake cell to `Unknown`;
/// 2. program the countdown with `plan.count`, or make sure it is stopped
///    when there is no plan (signal-only);
/// 3. clear stale pending flags on the countdown line and on `pin_line`;
/// 4. halt;
/// 5. restore clocks, then stop the countdown again.
///
/// Returns once the halt instruction has returned. A spurious wake is not
/// distinguished from a real one; the caller reads the wake cell.
pub fn run_cycle<C, W>(
    countdown: &mut C,
    controller: &mut W,
    wake: &WakeSourceCell,
    plan: Option<&CyclePlan>,
    pin_line: Option<ExtiLine>,
) -> Result<(), HalError>
where
    C: Countdown,
    W: WakeController,
{
    wake.reset();

    match plan {
        Some(plan) => {
            trace!("arming countdown: {} counts", plan.count);
            countdown.arm(plan.count)?;
        }
        None => countdown.disarm()?,
    }

    countdown.clear_pending()?;
    if let Some(line) = pin_line {
        controller.clear_pending(line)?;
    }

    controller.halt();
    controller.restore_clocks();

    if plan.is_some() {
        countdown.disarm()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_time::Duration;
    use platform::mocks::{
        leak_wake_cell, HalCall, MockCountdown, MockJournal, MockWakeController,
    };
    use platform::{WakeSource, AWU_LSI_128K_DIV4096};

    #[test]
    fn timed_cycle_order() {
        let journal = MockJournal::new();
        let cell = leak_wake_cell();
        cell.record(WakeSource::ExternalSignal);
        let mut countdown = MockCountdown::new(AWU_LSI_128K_DIV4096, journal.clone());
        let mut controller = MockWakeController::new(cell, journal.clone());
        let plan = CyclePlan {
            count: 31,
            covered: Duration::from_millis(992),
        };

        let result = run_cycle(
            &mut countdown,
            &mut controller,
            cell,
            Some(&plan),
            ExtiLine::new(2),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(
            journal.calls(),
            [
                HalCall::CountdownArm(31),
                HalCall::CountdownClearPending,
                HalCall::ClearPinPending(ExtiLine::new(2).unwrap_or(ExtiLine::AWU)),
                // the stale ExternalSignal was cleared before halting
                HalCall::Halt(WakeSource::Unknown),
                HalCall::RestoreClocks,
                HalCall::CountdownDisarm,
            ]
        );
        assert_eq!(cell.read(), WakeSource::Timer);
    }

    #[test]
    fn untimed_cycle_stops_the_countdown_first() {
        let journal = MockJournal::new();
        let cell = leak_wake_cell();
        let mut countdown = MockCountdown::new(AWU_LSI_128K_DIV4096, journal.clone());
        let mut controller = MockWakeController::new(cell, journal.clone())
            .with_script([WakeSource::ExternalSignal]);

        let result = run_cycle(&mut countdown, &mut controller, cell, None, ExtiLine::new(6));

        assert_eq!(result, Ok(()));
        assert!(journal.armed_counts().is_empty());
        assert_eq!(journal.calls().first(), Some(&HalCall::CountdownDisarm));
        assert_eq!(journal.halts(), 1);
        assert_eq!(cell.read(), WakeSource::ExternalSignal);
    }

    #[test]
    fn arm_failure_never_halts() {
        let journal = MockJournal::new();
        let cell = leak_wake_cell();
        let mut countdown = MockCountdown::new(AWU_LSI_128K_DIV4096, journal.clone());
        let mut controller = MockWakeController::new(cell, journal.clone());
        let plan = CyclePlan {
            count: 64,
            covered: Duration::from_millis(2048),
        };

        let result = run_cycle(&mut countdown, &mut controller, cell, Some(&plan), None);

        assert_eq!(result, Err(HalError::CountOutOfRange { count: 64 }));
        assert_eq!(journal.halts(), 0);
    }
}
