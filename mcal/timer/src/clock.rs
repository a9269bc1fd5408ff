//! Clock-select codes and per-timer prescaler tables

use core::fmt;

use mcal_core::{McalError, McalResult};

use crate::layout::TimerId;

/// Input clock feeding a timer's counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// No clock, counter halted
    Stopped,
    /// System clock divided by the prescaler
    Prescaled(u16),
    /// External pin, falling edge
    ExternalFalling,
    /// External pin, rising edge
    ExternalRising,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClockSource {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ClockSource::Stopped => defmt::write!(fmt, "Stopped"),
            ClockSource::Prescaled(div) => defmt::write!(fmt, "clk/{}", div),
            ClockSource::ExternalFalling => defmt::write!(fmt, "ExternalFalling"),
            ClockSource::ExternalRising => defmt::write!(fmt, "ExternalRising"),
        }
    }
}

/// Timers 0 and 1
pub const CLOCKS_SYNC: [ClockSource; 8] = [
    ClockSource::Stopped,
    ClockSource::Prescaled(1),
    ClockSource::Prescaled(8),
    ClockSource::Prescaled(64),
    ClockSource::Prescaled(256),
    ClockSource::Prescaled(1024),
    ClockSource::ExternalFalling,
    ClockSource::ExternalRising,
];

/// Timer 2 has a finer prescaler and no external clock input
pub const CLOCKS_TIMER2: [ClockSource; 8] = [
    ClockSource::Stopped,
    ClockSource::Prescaled(1),
    ClockSource::Prescaled(8),
    ClockSource::Prescaled(32),
    ClockSource::Prescaled(64),
    ClockSource::Prescaled(128),
    ClockSource::Prescaled(256),
    ClockSource::Prescaled(1024),
];

/// 3-bit clock-select code, shared code space across all timers.
///
/// Code 0 always stops the timer. What the other codes mean depends on the
/// timer; see [`ClockSelect::source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockSelect(u8);

impl ClockSelect {
    /// Counting halted
    pub const STOPPED: ClockSelect = ClockSelect(0);

    /// Largest valid code
    pub const MAX: ClockSelect = ClockSelect(7);

    /// Validate a raw code
    pub const fn new(code: u8) -> McalResult<Self> {
        if code <= Self::MAX.0 {
            Ok(ClockSelect(code))
        } else {
            Err(McalError::InvalidClock { code })
        }
    }

    /// Code read back from a 3-bit clock field
    pub(crate) const fn from_field(bits: u8) -> Self {
        ClockSelect(bits & Self::MAX.0)
    }

    /// Code that makes `id` count at `clk / divisor`
    pub fn for_divisor(id: TimerId, divisor: u16) -> McalResult<Self> {
        id.descriptor()
            .clocks
            .iter()
            .position(|src| *src == ClockSource::Prescaled(divisor))
            .map(|code| ClockSelect(code as u8))
            .ok_or(McalError::UnsupportedDivisor {
                timer: id.index(),
                divisor,
            })
    }

    /// Raw code
    pub const fn code(self) -> u8 {
        self.0
    }

    pub const fn is_stopped(self) -> bool {
        self.0 == 0
    }

    /// Clock source this code selects on `id`
    pub fn source(self, id: TimerId) -> ClockSource {
        id.descriptor().clocks[self.0 as usize]
    }
}

impl TryFrom<u8> for ClockSelect {
    type Error = McalError;

    fn try_from(code: u8) -> McalResult<Self> {
        ClockSelect::new(code)
    }
}

impl fmt::Display for ClockSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CS{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClockSelect {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "CS{}", self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_range() {
        assert_eq!(ClockSelect::new(7).map(ClockSelect::code), Ok(7));
        assert_eq!(ClockSelect::new(8), Err(McalError::InvalidClock { code: 8 }));
        assert!(ClockSelect::STOPPED.is_stopped());
        assert!(ClockSelect::default().is_stopped());
    }

    #[test]
    fn test_code_zero_stops_every_timer() {
        for id in TimerId::ALL {
            assert_eq!(ClockSelect::STOPPED.source(id), ClockSource::Stopped);
        }
    }

    #[test]
    fn test_divide_by_64_differs_on_timer2() {
        assert_eq!(ClockSelect::for_divisor(TimerId::Timer0, 64).map(ClockSelect::code), Ok(3));
        assert_eq!(ClockSelect::for_divisor(TimerId::Timer1, 64).map(ClockSelect::code), Ok(3));
        assert_eq!(ClockSelect::for_divisor(TimerId::Timer2, 64).map(ClockSelect::code), Ok(4));
    }

    #[test]
    fn test_divisor_only_on_timer2() {
        assert!(ClockSelect::for_divisor(TimerId::Timer2, 32).is_ok());
        assert_eq!(
            ClockSelect::for_divisor(TimerId::Timer0, 32),
            Err(McalError::UnsupportedDivisor { timer: 0, divisor: 32 })
        );
    }

    #[test]
    fn test_same_code_different_source() {
        let code = ClockSelect::new(3).unwrap();
        assert_eq!(code.source(TimerId::Timer0), ClockSource::Prescaled(64));
        assert_eq!(code.source(TimerId::Timer2), ClockSource::Prescaled(32));
        let ext = ClockSelect::new(6).unwrap();
        assert_eq!(ext.source(TimerId::Timer1), ClockSource::ExternalFalling);
        assert_eq!(ext.source(TimerId::Timer2), ClockSource::Prescaled(256));
    }
}
