//! CH32V003 register backend over the `ch32v0` peripheral access crate.
//!
//! | Countdown | Clock      | Tick  | Window   | Depth   |
//! |-----------|------------|-------|----------|---------|
//! | [`Awu`]   | LSI 128 kHz| 32 ms | 2.016 s  | Standby |
//! | [`Tim1`]  | HCLK 48 MHz| 1 ms  | 65.535 s | Sleep   |
//!
//! # Interrupt wiring
//!
//! The runtime owns the vector table, so the handlers here are plain
//! functions. Call them from the matching vectors:
//!
//! | Vector          | IRQ | Call                          |
//! |-----------------|-----|-------------------------------|
//! | `EXTI7_0`       | 20  | [`on_pin_interrupt`]          |
//! | `AWU`           | 21  | [`on_awu_interrupt`]          |
//! | `TIM1_UP`       | 35  | [`on_tim1_update_interrupt`]  |
//!
//! All three record into [`WAKE_SOURCE`], which is the cell to hand to
//! [`SleepDriver::new`](crate::SleepDriver::new).
//!
//! Multi-bit fields go through raw words computed in [`super::fields`];
//! single-bit flags use the PAC's named field writers.

use ch32v0::ch32v003 as pac;
use platform::{
    Countdown, CountdownTiming, ExtiLine, HalError, InterruptMode, PinMapping, Port,
    SleepDepth, WakeController, WakeSource, WakeSourceCell, AWU_LSI_128K_DIV4096,
    TIM1_HCLK_48M_1KHZ,
};

use super::fields;
use crate::config::LSI_READY_SPIN_LIMIT;

/// Wake-source cell written by the interrupt handlers in this module.
pub static WAKE_SOURCE: WakeSourceCell = WakeSourceCell::new();

const IRQ_EXTI7_0: u8 = 20;
const IRQ_AWU: u8 = 21;
const IRQ_TIM1_UP: u8 = 35;

// ── Register blocks ─────────────────────────────────────────────────────────

fn rcc() -> &'static pac::rcc::RegisterBlock {
    // SAFETY: fixed MMIO block from the PAC; single core, and the driver is
    // the only user of the bits it touches.
    unsafe { &*pac::RCC::ptr() }
}

fn pwr() -> &'static pac::pwr::RegisterBlock {
    // SAFETY: as for `rcc`.
    unsafe { &*pac::PWR::ptr() }
}

fn exti() -> &'static pac::exti::RegisterBlock {
    // SAFETY: as for `rcc`. INTFR is write-one-to-clear, so the handlers and
    // the foreground never race on a read-modify-write of it.
    unsafe { &*pac::EXTI::ptr() }
}

fn afio() -> &'static pac::afio::RegisterBlock {
    // SAFETY: as for `rcc`.
    unsafe { &*pac::AFIO::ptr() }
}

fn tim1() -> &'static pac::tim1::RegisterBlock {
    // SAFETY: as for `rcc`.
    unsafe { &*pac::TIM1::ptr() }
}

fn pfic() -> &'static pac::pfic::RegisterBlock {
    // SAFETY: as for `rcc`.
    unsafe { &*pac::PFIC::ptr() }
}

fn gpio(port: Port) -> &'static pac::gpioa::RegisterBlock {
    match port {
        // SAFETY: as for `rcc`; GPIOC/GPIOD share GPIOA's layout.
        Port::A => unsafe { &*pac::GPIOA::ptr() },
        // SAFETY: as above.
        Port::C => unsafe { &*pac::GPIOC::ptr() },
        // SAFETY: as above.
        Port::D => unsafe { &*pac::GPIOD::ptr() },
    }
}

fn enable_irq(irq: u8) {
    let (bank, bit) = fields::pfic_enable_bit(irq);
    let pfic = pfic();
    // Set-enable is write-one; zeros leave other interrupts alone.
    match bank {
        // SAFETY: IENRx accepts any word; only `bit` is set.
        0 => pfic.ienr1.write(|w| unsafe { w.bits(bit) }),
        // SAFETY: as above.
        _ => pfic.ienr2.write(|w| unsafe { w.bits(bit) }),
    }
}

fn set_exti_enable(line: ExtiLine, enabled: bool) {
    // SAFETY: word from `fields::line_enabled`, only `line` changes.
    exti()
        .intenr
        .modify(|r, w| unsafe { w.bits(fields::line_enabled(r.bits(), line, enabled)) });
}

fn clear_exti_pending(mask: u32) {
    // SAFETY: INTFR is write-one-to-clear; zero bits are ignored.
    exti().intfr.write(|w| unsafe { w.bits(mask) });
}

// ── Interrupt entry points ──────────────────────────────────────────────────

/// `EXTI7_0` handler body: acknowledge every pending GPIO line.
pub fn on_pin_interrupt() {
    let pending = fields::pending_gpio_lines(exti().intfr.read().bits());
    if pending != 0 {
        WAKE_SOURCE.record(WakeSource::ExternalSignal);
    }
    clear_exti_pending(pending);
}

/// `AWU` handler body.
pub fn on_awu_interrupt() {
    WAKE_SOURCE.record(WakeSource::Timer);
    clear_exti_pending(ExtiLine::AWU.mask());
}

/// `TIM1_UP` handler body: one-shot, the counter is stopped on expiry.
pub fn on_tim1_update_interrupt() {
    let tim1 = tim1();
    if tim1.intfr.read().uif().bit_is_set() {
        tim1.intfr.modify(|_, w| w.uif().clear_bit());
        tim1.ctlr1.modify(|_, w| w.cen().clear_bit());
        WAKE_SOURCE.record(WakeSource::Timer);
    }
}

fn check_count(timing: CountdownTiming, count: u32) -> Result<(), HalError> {
    if timing.accepts(count) {
        Ok(())
    } else {
        Err(HalError::CountOutOfRange { count })
    }
}

// ── AWU ─────────────────────────────────────────────────────────────────────

/// Auto-wakeup unit on the LSI. Keeps running in standby.
pub struct Awu {
    _private: (),
}

impl Awu {
    /// Take the AWU. Only one instance may exist.
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Countdown for Awu {
    fn timing(&self) -> CountdownTiming {
        AWU_LSI_128K_DIV4096
    }

    fn enable(&mut self) -> Result<(), HalError> {
        let rcc = rcc();
        rcc.apb1pcenr.modify(|_, w| w.pwren().set_bit());

        rcc.rstsckr.modify(|_, w| w.lsion().set_bit());
        let mut spins = 0u32;
        while rcc.rstsckr.read().lsirdy().bit_is_clear() {
            if spins >= LSI_READY_SPIN_LIMIT {
                warn!("LSI not ready after {=u32} polls", spins);
                return Err(HalError::ClockNotReady);
            }
            spins = spins.saturating_add(1);
            core::hint::spin_loop();
        }

        // AWU wake event arrives on EXTI line 9.
        let line = ExtiLine::AWU;
        set_exti_enable(line, true);
        // SAFETY: word from `fields::line_enabled`, only line 9 changes.
        exti()
            .ftenr
            .modify(|r, w| unsafe { w.bits(fields::line_enabled(r.bits(), line, true)) });

        // SAFETY: word from `fields::awupsc_div4096`, a valid prescaler code.
        pwr()
            .awupsc
            .modify(|r, w| unsafe { w.bits(fields::awupsc_div4096(r.bits())) });
        enable_irq(IRQ_AWU);
        Ok(())
    }

    fn arm(&mut self, count: u32) -> Result<(), HalError> {
        check_count(self.timing(), count)?;
        let pwr = pwr();
        // SAFETY: word from `fields::awuwr_window`, count fits the 6-bit field.
        pwr.awuwr
            .modify(|r, w| unsafe { w.bits(fields::awuwr_window(r.bits(), count)) });
        pwr.awucsr.modify(|_, w| w.awuen().set_bit());
        Ok(())
    }

    fn disarm(&mut self) -> Result<(), HalError> {
        pwr().awucsr.modify(|_, w| w.awuen().clear_bit());
        Ok(())
    }

    fn clear_pending(&mut self) -> Result<(), HalError> {
        clear_exti_pending(ExtiLine::AWU.mask());
        Ok(())
    }
}

// ── TIM1 ────────────────────────────────────────────────────────────────────

/// TIM1 as a one-shot countdown. Needs HCLK, so it only wakes from sleep.
pub struct Tim1 {
    _private: (),
}

impl Tim1 {
    /// Take TIM1. Only one instance may exist.
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Countdown for Tim1 {
    fn timing(&self) -> CountdownTiming {
        TIM1_HCLK_48M_1KHZ
    }

    fn depth(&self) -> SleepDepth {
        SleepDepth::Sleep
    }

    fn enable(&mut self) -> Result<(), HalError> {
        rcc().apb2pcenr.modify(|_, w| w.tim1en().set_bit());
        let tim1 = tim1();
        let psc = fields::tim1_psc(TIM1_HCLK_48M_1KHZ.prescaler);
        // SAFETY: PSC is a plain 16-bit divider; 47 999 fits.
        tim1.psc.write(|w| unsafe { w.bits(psc) });
        // Only counter overflow raises an update interrupt; UG in `arm` stays
        // silent.
        tim1.ctlr1.modify(|_, w| w.urs().set_bit());
        tim1.dmaintenr.modify(|_, w| w.uie().set_bit());
        enable_irq(IRQ_TIM1_UP);
        Ok(())
    }

    fn arm(&mut self, count: u32) -> Result<(), HalError> {
        check_count(self.timing(), count)?;
        let tim1 = tim1();
        tim1.ctlr1.modify(|_, w| w.cen().clear_bit());
        let reload = fields::tim1_reload(count);
        // SAFETY: `check_count` bounds the reload to 1..=65 534.
        tim1.atrlr.write(|w| unsafe { w.bits(reload) });
        // SAFETY: zero is a valid counter value.
        tim1.cnt.write(|w| unsafe { w.bits(0) });
        // Latch PSC/ATRLR.
        tim1.swevgr.write(|w| w.ug().set_bit());
        tim1.intfr.modify(|_, w| w.uif().clear_bit());
        tim1.ctlr1.modify(|_, w| w.cen().set_bit());
        Ok(())
    }

    fn disarm(&mut self) -> Result<(), HalError> {
        tim1().ctlr1.modify(|_, w| w.cen().clear_bit());
        Ok(())
    }

    fn clear_pending(&mut self) -> Result<(), HalError> {
        tim1().intfr.modify(|_, w| w.uif().clear_bit());
        Ok(())
    }
}

// ── EXTI / PWR / core ───────────────────────────────────────────────────────

/// Pin edge detection, PWR mode selection and `wfi`.
pub struct Ch32v003 {
    system_init: fn(),
}

impl Ch32v003 {
    /// `system_init` re-runs the clock setup (HSI/PLL, flash wait states)
    /// after every wake, before any other peripheral is touched.
    pub const fn new(system_init: fn()) -> Self {
        Self { system_init }
    }
}

impl WakeController for Ch32v003 {
    fn select_depth(&mut self, depth: SleepDepth) -> Result<(), HalError> {
        rcc().apb1pcenr.modify(|_, w| w.pwren().set_bit());
        let standby = depth == SleepDepth::Standby;
        pwr().ctlr.modify(|_, w| w.pdds().bit(standby));
        pfic().sctlr.modify(|_, w| w.sleepdeep().bit(standby));
        Ok(())
    }

    fn arm_pin(&mut self, pin: PinMapping, mode: InterruptMode) -> Result<(), HalError> {
        rcc().apb2pcenr.modify(|_, w| {
            let w = w.afioen().set_bit();
            match pin.port {
                Port::A => w.iopaen().set_bit(),
                Port::C => w.iopcen().set_bit(),
                Port::D => w.iopden().set_bit(),
            }
        });

        let port = gpio(pin.port);
        // SAFETY: word from `fields::cfglr_input_pull`, only this pin's nibble.
        port.cfglr
            .modify(|r, w| unsafe { w.bits(fields::cfglr_input_pull(r.bits(), pin.pin)) });
        let pull = fields::bshr_pull(pin.pin, mode.pull());
        // SAFETY: BSHR is write-only set/reset; one bit is written.
        port.bshr.write(|w| unsafe { w.bits(pull) });

        // SAFETY: word from `fields::exticr_route`, only this line's field.
        afio()
            .exticr
            .modify(|r, w| unsafe { w.bits(fields::exticr_route(r.bits(), pin.line, pin.port)) });

        let exti = exti();
        let (rtenr, ftenr) = fields::edge_select(
            exti.rtenr.read().bits(),
            exti.ftenr.read().bits(),
            pin.line,
            mode,
        );
        // SAFETY: words from `fields::edge_select`, only this line changes.
        exti.rtenr.write(|w| unsafe { w.bits(rtenr) });
        // SAFETY: as above.
        exti.ftenr.write(|w| unsafe { w.bits(ftenr) });
        set_exti_enable(pin.line, true);

        enable_irq(IRQ_EXTI7_0);
        Ok(())
    }

    fn disarm_pin(&mut self, pin: PinMapping) -> Result<(), HalError> {
        set_exti_enable(pin.line, false);
        let exti = exti();
        // SAFETY: word from `fields::line_enabled`, only this line changes.
        exti.rtenr
            .modify(|r, w| unsafe { w.bits(fields::line_enabled(r.bits(), pin.line, false)) });
        // SAFETY: as above.
        exti.ftenr
            .modify(|r, w| unsafe { w.bits(fields::line_enabled(r.bits(), pin.line, false)) });
        Ok(())
    }

    fn clear_pending(&mut self, line: ExtiLine) -> Result<(), HalError> {
        clear_exti_pending(line.mask());
        Ok(())
    }

    fn halt(&mut self) {
        // SAFETY: `wfi` only suspends the hart until an interrupt is pending;
        // it touches no memory.
        #[cfg(target_arch = "riscv32")]
        unsafe {
            core::arch::asm!("wfi", options(nomem, nostack));
        }
        #[cfg(not(target_arch = "riscv32"))]
        core::hint::spin_loop();
    }

    fn restore_clocks(&mut self) {
        (self.system_init)();
    }
}
