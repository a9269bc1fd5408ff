//! `embedded-hal` PWM adapter over one compare channel

use core::fmt;

use embedded_hal::pwm::{Error, ErrorKind, ErrorType, SetDutyCycle};
use mcal_core::{McalError, RegisterBus};

use crate::driver::Timers;
use crate::layout::{Channel, TimerId};
use crate::output::OutputMode;

/// Largest duty value; the supported PWM submodes are 8-bit on every timer
pub const MAX_DUTY: u16 = 0xFF;

/// Errors from [`PwmChannel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// Duty above [`MAX_DUTY`]
    DutyOutOfRange { duty: u16 },
    /// Rejected by the timer driver
    Driver(McalError),
}

impl From<McalError> for PwmError {
    fn from(err: McalError) -> Self {
        PwmError::Driver(err)
    }
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PwmError::DutyOutOfRange { duty } => {
                write!(f, "duty {} exceeds {}", duty, MAX_DUTY)
            }
            PwmError::Driver(err) => write!(f, "{}", err),
        }
    }
}

impl Error for PwmError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PwmError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PwmError::DutyOutOfRange { duty } => defmt::write!(fmt, "DutyOutOfRange({})", duty),
            PwmError::Driver(err) => defmt::write!(fmt, "Driver({})", err),
        }
    }
}

/// One compare channel borrowed from [`Timers`] as a PWM output.
///
/// Duty writes go through [`Timers::set_duty_raw`]; the waveform mode and
/// clock are whatever the timer was configured with.
pub struct PwmChannel<'a, B> {
    timers: &'a mut Timers<B>,
    id: TimerId,
    channel: Channel,
}

impl<'a, B: RegisterBus> PwmChannel<'a, B> {
    /// Caller has already checked that `id` has `channel`
    pub(crate) fn new(timers: &'a mut Timers<B>, id: TimerId, channel: Channel) -> Self {
        Self { timers, id, channel }
    }

    pub fn timer(&self) -> TimerId {
        self.id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Connect the output pin, non-inverting
    pub fn enable(&mut self) -> Result<(), PwmError> {
        self.timers
            .set_output_mode(self.id, self.channel, OutputMode::Clear)?;
        Ok(())
    }

    /// Disconnect the output pin; the compare register is kept
    pub fn disable(&mut self) -> Result<(), PwmError> {
        self.timers
            .set_output_mode(self.id, self.channel, OutputMode::Disconnected)?;
        Ok(())
    }
}

impl<B> ErrorType for PwmChannel<'_, B> {
    type Error = PwmError;
}

impl<B: RegisterBus> SetDutyCycle for PwmChannel<'_, B> {
    fn max_duty_cycle(&self) -> u16 {
        MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let raw = u8::try_from(duty).map_err(|_| PwmError::DutyOutOfRange { duty })?;
        self.timers.set_duty_raw(self.id, self.channel, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::OCR2;
    use mcal_core::RegisterFile;

    #[test]
    fn test_duty_goes_to_compare() {
        let mut timers = Timers::new(RegisterFile::new());
        let mut pwm = timers.pwm_channel(TimerId::Timer2, Channel::A).unwrap();
        assert_eq!(pwm.max_duty_cycle(), 255);
        pwm.set_duty_cycle_percent(50).unwrap();
        assert_eq!(timers.bus().peek(OCR2), 127);
    }

    #[test]
    fn test_duty_above_max_rejected() {
        let mut timers = Timers::new(RegisterFile::new());
        let mut pwm = timers.pwm_channel(TimerId::Timer0, Channel::A).unwrap();
        assert_eq!(
            pwm.set_duty_cycle(256),
            Err(PwmError::DutyOutOfRange { duty: 256 })
        );
        assert_eq!(pwm.set_duty_cycle(256).unwrap_err().kind(), ErrorKind::Other);
    }

    #[test]
    fn test_enable_disable_output() {
        let mut timers = Timers::new(RegisterFile::new());
        {
            let mut pwm = timers.pwm_channel(TimerId::Timer1, Channel::B).unwrap();
            pwm.enable().unwrap();
        }
        assert_eq!(timers.output_mode(TimerId::Timer1, Channel::B), Ok(OutputMode::Clear));
        assert_eq!(timers.output_mode(TimerId::Timer1, Channel::A), Ok(OutputMode::Disconnected));

        timers
            .pwm_channel(TimerId::Timer1, Channel::B)
            .unwrap()
            .disable()
            .unwrap();
        assert_eq!(timers.output_mode(TimerId::Timer1, Channel::B), Ok(OutputMode::Disconnected));
    }

    #[test]
    fn test_missing_channel() {
        let mut timers = Timers::new(RegisterFile::new());
        assert!(timers.pwm_channel(TimerId::Timer2, Channel::B).is_err());
    }
}
