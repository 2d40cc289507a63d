//! Wake-pin identifiers and the pin → edge-detect line mapping
//!
//! A [`WakePin`] is a logical identifier encoded as `(port_group << 4) | pin`.
//! Only the pins listed in [`SUPPORTED_PINS`] can wake the part; everything
//! else resolves to [`InvalidPin`]. Resolution is a table lookup, so an
//! unsupported identifier never reaches register arithmetic.

use thiserror_no_std::Error;

/// GPIO port that can be routed to an EXTI line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// GPIOA (port group 0)
    A,
    /// GPIOC (port group 2)
    C,
    /// GPIOD (port group 3)
    D,
}

impl Port {
    /// Port group number as used in AFIO routing and the pin identifier.
    pub const fn group(self) -> u8 {
        match self {
            Self::A => 0,
            Self::C => 2,
            Self::D => 3,
        }
    }

    /// Look up a port from its group number.
    pub const fn from_group(group: u8) -> Option<Self> {
        match group {
            0 => Some(Self::A),
            2 => Some(Self::C),
            3 => Some(Self::D),
            _ => None,
        }
    }
}

/// Pull resistor direction for an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// Pull-up (idle high)
    Up,
    /// Pull-down (idle low)
    Down,
}

/// External interrupt edge selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptMode {
    /// Trigger on rising edge
    RisingEdge,
    /// Trigger on falling edge
    #[default]
    FallingEdge,
    /// Trigger on both edges
    BothEdges,
}

impl InterruptMode {
    /// Pull direction that keeps the line idle on the non-triggering level.
    pub const fn pull(self) -> Pull {
        match self {
            Self::RisingEdge => Pull::Down,
            Self::FallingEdge | Self::BothEdges => Pull::Up,
        }
    }

    /// Whether rising-edge detection is enabled in this mode.
    pub const fn detects_rising(self) -> bool {
        matches!(self, Self::RisingEdge | Self::BothEdges)
    }

    /// Whether falling-edge detection is enabled in this mode.
    pub const fn detects_falling(self) -> bool {
        matches!(self, Self::FallingEdge | Self::BothEdges)
    }
}

/// EXTI (edge-detect) line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct ExtiLine(u8);

impl ExtiLine {
    /// Line 9 carries the auto-wakeup (AWU) event.
    pub const AWU: Self = Self(9);

    /// Highest line number on the part.
    pub const MAX: u8 = 9;

    /// Create a line handle. Returns `None` above [`ExtiLine::MAX`].
    pub const fn new(line: u8) -> Option<Self> {
        if line > Self::MAX {
            None
        } else {
            Some(Self(line))
        }
    }

    /// Line number.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Single-bit mask for the EXTI registers.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn mask(self) -> u32 {
        // self.0 <= 9 by construction
        1 << self.0
    }
}

/// Logical wake-pin identifier: `(port_group << 4) | pin_index`.
///
/// Any byte is a representable identifier; use [`WakePin::resolve`] to find
/// out whether the part can actually wake from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct WakePin(u8);

impl WakePin {
    /// PA2
    pub const PA2: Self = Self::new(0, 2);
    /// PC1
    pub const PC1: Self = Self::new(2, 1);
    /// PC2
    pub const PC2: Self = Self::new(2, 2);
    /// PC4
    pub const PC4: Self = Self::new(2, 4);
    /// PD4
    pub const PD4: Self = Self::new(3, 4);
    /// PD6
    pub const PD6: Self = Self::new(3, 6);

    /// Build an identifier from a port group and pin index (each 4 bits).
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn new(port_group: u8, pin_index: u8) -> Self {
        Self(((port_group & 0x0F) << 4) | (pin_index & 0x0F))
    }

    /// Raw encoded identifier.
    pub const fn id(self) -> u8 {
        self.0
    }

    /// Port group nibble.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn port_group(self) -> u8 {
        (self.0 >> 4) & 0x0F
    }

    /// Pin index nibble.
    pub const fn pin_index(self) -> u8 {
        self.0 & 0x0F
    }

    /// Map this identifier onto its port, pin and EXTI line.
    ///
    /// # Errors
    ///
    /// [`InvalidPin`] if the identifier is not in [`SUPPORTED_PINS`].
    pub fn resolve(self) -> Result<PinMapping, InvalidPin> {
        SUPPORTED_PINS
            .iter()
            .find(|m| m.pin_id() == self)
            .copied()
            .ok_or(InvalidPin { id: self.0 })
    }
}

impl From<u8> for WakePin {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// A supported wake pin resolved to its hardware coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMapping {
    /// Owning GPIO port
    pub port: Port,
    /// Pin index within the port (0–7)
    pub pin: u8,
    /// EXTI line the pin is routed to
    pub line: ExtiLine,
}

impl PinMapping {
    /// The logical identifier for this mapping.
    pub const fn pin_id(&self) -> WakePin {
        WakePin::new(self.port.group(), self.pin)
    }
}

/// Every (port, pin, line) triple the driver accepts.
///
/// The EXTI line always equals the pin index; the AFIO router picks which
/// port drives it. PA2 and PC2 therefore share line 2 — arming one re-routes
/// the line away from the other.
pub const SUPPORTED_PINS: &[PinMapping] = &[
    PinMapping {
        port: Port::A,
        pin: 2,
        line: ExtiLine(2),
    },
    PinMapping {
        port: Port::C,
        pin: 1,
        line: ExtiLine(1),
    },
    PinMapping {
        port: Port::C,
        pin: 2,
        line: ExtiLine(2),
    },
    PinMapping {
        port: Port::C,
        pin: 4,
        line: ExtiLine(4),
    },
    PinMapping {
        port: Port::D,
        pin: 4,
        line: ExtiLine(4),
    },
    PinMapping {
        port: Port::D,
        pin: 6,
        line: ExtiLine(6),
    },
];

/// The identifier does not name a pin the part can wake from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("pin identifier {id:#04x} is not a supported wake pin")]
pub struct InvalidPin {
    /// The rejected identifier
    pub id: u8,
}
