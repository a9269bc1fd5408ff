//! Waveform-generation mode translation
//!
//! Logical modes map onto each timer's waveform-generation field through a
//! per-timer table. A mode missing from a timer's table, or a physical bit
//! pattern missing from it on read-back, is an error; nothing falls back to
//! Normal.

use mcal_core::{McalError, McalResult};

use crate::layout::TimerId;

/// Logical operating mode shared by all timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimerMode {
    /// Free-running, overflow at MAX
    Normal = 0,
    /// Phase-correct PWM, 8-bit resolution
    PhaseCorrectPwm = 1,
    /// Clear timer on compare match (compare A is TOP)
    Ctc = 2,
    /// Fast PWM, 8-bit resolution
    FastPwm = 3,
}

impl TimerMode {
    pub const ALL: [TimerMode; 4] = [
        TimerMode::Normal,
        TimerMode::PhaseCorrectPwm,
        TimerMode::Ctc,
        TimerMode::FastPwm,
    ];

    /// True for the PWM modes
    pub const fn is_pwm(self) -> bool {
        matches!(self, TimerMode::PhaseCorrectPwm | TimerMode::FastPwm)
    }
}

impl TryFrom<u8> for TimerMode {
    type Error = McalError;

    fn try_from(code: u8) -> McalResult<Self> {
        match code {
            0 => Ok(TimerMode::Normal),
            1 => Ok(TimerMode::PhaseCorrectPwm),
            2 => Ok(TimerMode::Ctc),
            3 => Ok(TimerMode::FastPwm),
            _ => Err(McalError::UnsupportedMode { code }),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TimerMode::Normal => defmt::write!(fmt, "Normal"),
            TimerMode::PhaseCorrectPwm => defmt::write!(fmt, "PhaseCorrectPwm"),
            TimerMode::Ctc => defmt::write!(fmt, "Ctc"),
            TimerMode::FastPwm => defmt::write!(fmt, "FastPwm"),
        }
    }
}

/// WGMn1:WGMn0 patterns of the 8-bit timers
pub const WGM_8BIT: [(TimerMode, u8); 4] = [
    (TimerMode::Normal, 0b00),
    (TimerMode::PhaseCorrectPwm, 0b01),
    (TimerMode::Ctc, 0b10),
    (TimerMode::FastPwm, 0b11),
];

/// WGM13:WGM10 patterns of the 16-bit timer.
///
/// Only the 8-bit PWM submodes; the 9/10-bit and ICR1/OCR1A-top variants
/// have no logical mode.
pub const WGM_16BIT: [(TimerMode, u8); 4] = [
    (TimerMode::Normal, 0b0000),
    (TimerMode::PhaseCorrectPwm, 0b0001),
    (TimerMode::Ctc, 0b0100),
    (TimerMode::FastPwm, 0b0101),
];

/// Waveform bits that select `mode` on `id`
pub fn encode(id: TimerId, mode: TimerMode) -> McalResult<u8> {
    id.descriptor()
        .modes
        .iter()
        .find(|(m, _)| *m == mode)
        .map(|&(_, bits)| bits)
        .ok_or(McalError::UnsupportedMode { code: mode as u8 })
}

/// Logical mode selected by waveform `bits` on `id`
pub fn decode(id: TimerId, bits: u8) -> McalResult<TimerMode> {
    id.descriptor()
        .modes
        .iter()
        .find(|&&(_, b)| b == bits)
        .map(|&(mode, _)| mode)
        .ok_or(McalError::UnsupportedWaveform {
            timer: id.index(),
            bits,
        })
}
