//! Compare-output mode translation

use mcal_core::{McalError, McalResult};

use crate::layout::{Channel, TimerId};

/// What a compare match does to the channel's output pin.
///
/// Numbered identically on every timer. In PWM modes `Clear` is
/// non-inverting and `Set` is inverting output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum OutputMode {
    #[default]
    Disconnected = 0,
    Toggle = 1,
    Clear = 2,
    Set = 3,
}

impl OutputMode {
    pub const ALL: [OutputMode; 4] = [
        OutputMode::Disconnected,
        OutputMode::Toggle,
        OutputMode::Clear,
        OutputMode::Set,
    ];

    /// Pin is driven by the timer
    pub const fn is_connected(self) -> bool {
        !matches!(self, OutputMode::Disconnected)
    }
}

impl TryFrom<u8> for OutputMode {
    type Error = McalError;

    fn try_from(code: u8) -> McalResult<Self> {
        match code {
            0 => Ok(OutputMode::Disconnected),
            1 => Ok(OutputMode::Toggle),
            2 => Ok(OutputMode::Clear),
            3 => Ok(OutputMode::Set),
            _ => Err(McalError::UnsupportedOutputMode { code }),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OutputMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            OutputMode::Disconnected => defmt::write!(fmt, "Disconnected"),
            OutputMode::Toggle => defmt::write!(fmt, "Toggle"),
            OutputMode::Clear => defmt::write!(fmt, "Clear"),
            OutputMode::Set => defmt::write!(fmt, "Set"),
        }
    }
}

/// COMn1:COMn0 pattern for `mode` on `channel` of `id`.
///
/// The pattern is the same everywhere; only the channel check and the field
/// position (held by the layout) differ per timer.
pub fn encode(id: TimerId, channel: Channel, mode: OutputMode) -> McalResult<u8> {
    id.check_channel(channel)?;
    Ok(mode as u8)
}

/// Logical mode from a COM field value
pub fn decode(bits: u8) -> McalResult<OutputMode> {
    OutputMode::try_from(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_are_uniform() {
        for id in TimerId::ALL {
            for mode in OutputMode::ALL {
                assert_eq!(encode(id, Channel::A, mode), Ok(mode as u8));
                assert_eq!(decode(mode as u8), Ok(mode));
            }
        }
    }

    #[test]
    fn test_channel_b_only_on_timer1() {
        assert_eq!(encode(TimerId::Timer1, Channel::B, OutputMode::Set), Ok(0b11));
        assert_eq!(
            encode(TimerId::Timer0, Channel::B, OutputMode::Set),
            Err(McalError::InvalidChannel { timer: 0, channel: 1 })
        );
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(
            OutputMode::try_from(4),
            Err(McalError::UnsupportedOutputMode { code: 4 })
        );
    }
}
