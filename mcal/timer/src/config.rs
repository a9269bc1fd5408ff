//! One-shot timer configuration record

use mcal_core::McalResult;

use crate::clock::ClockSelect;
use crate::irq::Interrupts;
use crate::layout::{Channel, TimerId};
use crate::mode::TimerMode;
use crate::output::OutputMode;

/// Everything `init` applies to one timer.
///
/// Built by the caller, consumed once by [`Timers::init`](crate::Timers::init)
/// and not retained. Channel B settings are ignored on single-channel
/// timers. Counter and compare values are masked to the timer's width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    pub id: TimerId,
    pub mode: TimerMode,
    /// Written last; [`ClockSelect::STOPPED`] leaves the timer halted
    pub clock: ClockSelect,
    /// Compare-output mode per channel
    pub output: [OutputMode; 2],
    pub counter: u16,
    /// Compare preload per channel
    pub compare: [u16; 2],
    pub interrupts: Interrupts,
    /// Make the output pin of every connected channel an output
    pub configure_pins: bool,
}

impl TimerConfig {
    /// Configuration matching the hardware reset state: stopped, Normal
    /// mode, outputs disconnected, everything zero.
    pub fn new(id: TimerId) -> Self {
        Self {
            id,
            mode: TimerMode::Normal,
            clock: ClockSelect::STOPPED,
            output: [OutputMode::Disconnected; 2],
            counter: 0,
            compare: [0; 2],
            interrupts: Interrupts::NONE,
            configure_pins: false,
        }
    }

    /// Application default: non-inverting Fast PWM at clk/64 on every
    /// channel the timer has, pins configured, interrupts off.
    pub fn pwm(id: TimerId) -> McalResult<Self> {
        let clock = ClockSelect::for_divisor(id, 64)?;
        let mut output = [OutputMode::Disconnected; 2];
        for slot in output.iter_mut().take(id.descriptor().channels()) {
            *slot = OutputMode::Clear;
        }
        Ok(Self {
            mode: TimerMode::FastPwm,
            clock,
            output,
            configure_pins: true,
            ..Self::new(id)
        })
    }

    pub fn with_mode(mut self, mode: TimerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_clock(mut self, clock: ClockSelect) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_output(mut self, channel: Channel, mode: OutputMode) -> Self {
        self.output[channel.index()] = mode;
        self
    }

    pub fn with_counter(mut self, value: u16) -> Self {
        self.counter = value;
        self
    }

    pub fn with_compare(mut self, channel: Channel, value: u16) -> Self {
        self.compare[channel.index()] = value;
        self
    }

    pub fn with_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = interrupts;
        self
    }

    pub fn with_pins(mut self, configure: bool) -> Self {
        self.configure_pins = configure;
        self
    }
}
