//! Register words for the CH32V003 backend.
//!
//! Each function maps a register's current word to the word the backend
//! writes, so the field layout can be checked on the host without the PAC.

// Field arithmetic: every shift is by a pin/line number below 10, masked
// before use, or a fixed field position.
#![allow(clippy::arithmetic_side_effects)]

use platform::{ExtiLine, InterruptMode, Port, Pull};

/// CFGLR nibble for input with pull-up/pull-down (MODE = 00, CNF = 10).
pub const CFG_INPUT_PULL: u32 = 0b1000;

/// AWUPSC code for LSI / 4096.
pub const AWUPSC_DIV4096: u32 = 0b1101;

const AWUPSC_MASK: u32 = 0x0F;
const AWUWR_MASK: u32 = 0x3F;

/// EXTI lines 0–7 are the GPIO lines served by the `EXTI7_0` vector.
pub const GPIO_LINES: u32 = 0xFF;

/// Switch `pin` of a port to input with pull, leaving the other pins alone.
pub fn cfglr_input_pull(current: u32, pin: u8) -> u32 {
    let shift = 4 * u32::from(pin & 0x7);
    (current & !(0xF << shift)) | (CFG_INPUT_PULL << shift)
}

/// BSHR word selecting the pull direction: set bits pull up, reset bits
/// (upper half) pull down.
pub fn bshr_pull(pin: u8, pull: Pull) -> u32 {
    let bit = u32::from(pin & 0x7);
    match pull {
        Pull::Up => 1 << bit,
        Pull::Down => 1 << (bit + 16),
    }
}

/// Route `line` to `port` in AFIO EXTICR: two bits per line,
/// `00` PA, `10` PC, `11` PD.
pub fn exticr_route(current: u32, line: ExtiLine, port: Port) -> u32 {
    let shift = 2 * u32::from(line.number() & 0x7);
    (current & !(0b11 << shift)) | (u32::from(port.group() & 0b11) << shift)
}

/// Set or clear `line` in an EXTI mask register (INTENR, RTENR, FTENR).
pub fn line_enabled(current: u32, line: ExtiLine, enabled: bool) -> u32 {
    if enabled {
        current | line.mask()
    } else {
        current & !line.mask()
    }
}

/// RTENR and FTENR words for `line` on `mode`.
pub fn edge_select(rtenr: u32, ftenr: u32, line: ExtiLine, mode: InterruptMode) -> (u32, u32) {
    (
        line_enabled(rtenr, line, mode.detects_rising()),
        line_enabled(ftenr, line, mode.detects_falling()),
    )
}

/// GPIO lines pending in an EXTI INTFR word.
pub fn pending_gpio_lines(intfr: u32) -> u32 {
    intfr & GPIO_LINES
}

/// AWUWR with a new 6-bit window.
pub fn awuwr_window(current: u32, count: u32) -> u32 {
    (current & !AWUWR_MASK) | (count & AWUWR_MASK)
}

/// AWUPSC with the LSI / 4096 prescaler.
pub fn awupsc_div4096(current: u32) -> u32 {
    (current & !AWUPSC_MASK) | AWUPSC_DIV4096
}

/// TIM1 PSC for a prescaler ratio (the counter divides by `PSC + 1`).
pub fn tim1_psc(prescaler: u32) -> u32 {
    prescaler.saturating_sub(1)
}

/// TIM1 ATRLR for `count` ticks (an update fires after `ATRLR + 1` ticks).
pub fn tim1_reload(count: u32) -> u32 {
    count.saturating_sub(1)
}

/// PFIC set-enable bank (`0` = IENR1, `1` = IENR2) and bit for `irq`.
pub fn pfic_enable_bit(irq: u8) -> (u8, u32) {
    (irq / 32, 1 << (irq % 32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: u8) -> ExtiLine {
        ExtiLine::new(n).unwrap_or(ExtiLine::AWU)
    }

    #[test]
    fn cfglr_touches_only_the_pin_nibble() {
        // every pin push-pull output 50 MHz
        let current = 0x3333_3333;
        assert_eq!(cfglr_input_pull(current, 2), 0x3333_3833);
        assert_eq!(cfglr_input_pull(current, 6), 0x3833_3333);
        assert_eq!(cfglr_input_pull(0, 0), 0x0000_0008);
    }

    #[test]
    fn pull_follows_edge_polarity() {
        // falling edge: idle high, pull up
        let up = bshr_pull(4, InterruptMode::FallingEdge.pull());
        assert_eq!(up, 1 << 4);
        // rising edge: idle low, pull down through the reset half
        let down = bshr_pull(4, InterruptMode::RisingEdge.pull());
        assert_eq!(down, 1 << 20);
    }

    #[test]
    fn exticr_uses_two_bits_per_line() {
        assert_eq!(exticr_route(0, line(2), Port::A), 0);
        assert_eq!(exticr_route(0, line(1), Port::C), 0b10 << 2);
        assert_eq!(exticr_route(0, line(6), Port::D), 0b11 << 12);
        // re-routing PC2 back to PA2 clears the old code
        let pc2 = exticr_route(0xFFFF, line(2), Port::C);
        assert_eq!(pc2, 0xFFEF);
        assert_eq!(exticr_route(pc2, line(2), Port::A), 0xFFCF);
    }

    #[test]
    fn edge_selection() {
        let l4 = line(4);
        assert_eq!(
            edge_select(0, 0, l4, InterruptMode::FallingEdge),
            (0, 1 << 4)
        );
        assert_eq!(
            edge_select(0, 0, l4, InterruptMode::RisingEdge),
            (1 << 4, 0)
        );
        assert_eq!(
            edge_select(0, 0, l4, InterruptMode::BothEdges),
            (1 << 4, 1 << 4)
        );
        // switching falling → rising drops the stale falling enable
        assert_eq!(
            edge_select(0x0001, 0x0011, l4, InterruptMode::RisingEdge),
            (0x0011, 0x0001)
        );
    }

    #[test]
    fn line_mask_leaves_other_lines() {
        assert_eq!(line_enabled(0x0201, ExtiLine::AWU, false), 0x0001);
        assert_eq!(line_enabled(0x0001, ExtiLine::AWU, true), 0x0201);
    }

    #[test]
    fn awu_line_is_not_a_gpio_line() {
        assert_eq!(pending_gpio_lines(0x0244), 0x0044);
        assert_eq!(pending_gpio_lines(ExtiLine::AWU.mask()), 0);
    }

    #[test]
    fn awu_fields() {
        assert_eq!(awuwr_window(0xFFFF_FFC0, 63), 0xFFFF_FFFF);
        assert_eq!(awuwr_window(0x3F, 30), 30);
        assert_eq!(awupsc_div4096(0xF0), 0xFD);
    }

    #[test]
    fn tim1_fields() {
        assert_eq!(tim1_psc(48_000), 47_999);
        assert_eq!(tim1_reload(2), 1);
        assert_eq!(tim1_reload(65_535), 65_534);
    }

    #[test]
    fn pfic_banks() {
        // EXTI7_0, AWU, TIM1_UP
        assert_eq!(pfic_enable_bit(20), (0, 1 << 20));
        assert_eq!(pfic_enable_bit(21), (0, 1 << 21));
        assert_eq!(pfic_enable_bit(35), (1, 1 << 3));
    }
}
