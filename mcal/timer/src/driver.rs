//! Unified timer driver
//!
//! [`Timers`] owns the register bus and implements every public operation
//! by dispatching on [`TimerId`] into the layout table. It keeps no software
//! copy of hardware state: every read-back, including the clock selection
//! restored by [`Timers::set_mode`], comes from the registers.
//!
//! # Concurrency
//!
//! Each call is a short, fixed sequence of register transfers run in the
//! caller's context. Single-register updates are atomic with respect to
//! interrupt handlers, but these are not:
//!
//! - [`Timers::init`] and [`Timers::set_mode`]
//! - every counter and compare access on the 16-bit timer, including
//!   [`Timers::set_duty_raw`], which reads the high byte back and rewrites
//!   the whole pair
//!
//! The 16-bit registers share one TEMP byte in hardware, so an interrupt
//! handler touching any of them can also corrupt a pair access that is in
//! progress on a different register.
//!
//! When an interrupt source that touches the same timer is enabled, wrap
//! those calls in a critical section (for example `critical_section::with`).
//! The driver neither provides nor detects one.

use log::{debug, trace, warn};
use mcal_core::{McalResult, RegisterBus};

use crate::clock::ClockSelect;
use crate::config::TimerConfig;
use crate::irq::{self, Interrupts};
use crate::layout::{Channel, TimerId, Width};
use crate::mode::{self, TimerMode};
use crate::output::{self, OutputMode};
use crate::pwm::PwmChannel;

/// Run state, derived from the clock-select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Clock field is zero; mode and output settings are retained
    Stopped,
    /// Counting with this clock selection
    Running(ClockSelect),
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TimerState::Stopped => defmt::write!(fmt, "Stopped"),
            TimerState::Running(cs) => defmt::write!(fmt, "Running({})", cs),
        }
    }
}

/// Channels `id` actually has
fn channels(id: TimerId) -> impl Iterator<Item = Channel> {
    [Channel::A, Channel::B]
        .into_iter()
        .take(id.descriptor().channels())
}

/// Driver for Timer/Counter0, 1 and 2 over one register bus.
#[derive(Debug)]
pub struct Timers<B> {
    bus: B,
}

impl<B: RegisterBus> Timers<B> {
    /// Wrap a bus. No register is touched.
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// Apply a full configuration and leave the timer on `config.clock`.
    ///
    /// All values are validated before the first transfer. The clock field
    /// is zeroed first and written last, so the first tick happens only
    /// after mode, outputs, preloads and interrupt enables are in place.
    pub fn init(&mut self, config: &TimerConfig) -> McalResult<()> {
        let id = config.id;
        let layout = id.layout();

        let wgm = mode::encode(id, config.mode)?;
        let mut com = [0u8; 2];
        for ch in channels(id) {
            com[ch.index()] = output::encode(id, ch, config.output[ch.index()])?;
        }

        let channel_b_requested = config.output[1].is_connected()
            || config.compare[1] != 0
            || config.interrupts.compare_b;
        if id.descriptor().channels() < 2 && channel_b_requested {
            warn!("{} has no channel B, ignoring its settings", id);
        }
        debug!(
            "{} init: mode={:?} clock={} output={:?} irq={:?}",
            id, config.mode, config.clock, config.output, config.interrupts
        );

        layout.clock.write(&mut self.bus, ClockSelect::STOPPED.code());
        layout.mode.write(&mut self.bus, wgm);

        if config.configure_pins {
            for ch in channels(id) {
                if config.output[ch.index()].is_connected() {
                    self.bus.write_bit(layout.pins[ch.index()], true);
                }
            }
        }

        for ch in channels(id) {
            layout.output[ch.index()].write(&mut self.bus, com[ch.index()]);
        }

        self.write_counter(id, config.counter);
        for ch in channels(id) {
            self.write_compare(id, ch, config.compare[ch.index()]);
        }

        irq::set_enables(&mut self.bus, id, config.interrupts);
        layout.clock.write(&mut self.bus, config.clock.code());
        Ok(())
    }

    /// Select a clock. Takes effect immediately without resetting the
    /// counter; mode and output fields are untouched.
    pub fn start(&mut self, id: TimerId, clock: ClockSelect) {
        trace!("{} clock {}", id, clock);
        id.layout().clock.write(&mut self.bus, clock.code());
    }

    /// Halt counting by zeroing only the clock field.
    pub fn stop(&mut self, id: TimerId) {
        trace!("{} stop", id);
        id.layout().clock.write(&mut self.bus, ClockSelect::STOPPED.code());
    }

    /// Change the waveform mode, keeping whatever clock is selected.
    ///
    /// The clock field is read back from hardware, zeroed, the new mode is
    /// written, and the clock is restored. The only intermediate state is
    /// fully stopped.
    pub fn set_mode(&mut self, id: TimerId, mode: TimerMode) -> McalResult<()> {
        let wgm = mode::encode(id, mode)?;
        let layout = id.layout();

        let clock = layout.clock.read(&mut self.bus);
        layout.clock.write(&mut self.bus, ClockSelect::STOPPED.code());
        layout.mode.write(&mut self.bus, wgm);
        layout.clock.write(&mut self.bus, clock);

        debug!("{} mode {:?}, clock CS{} kept", id, mode, clock);
        Ok(())
    }

    /// Set one channel's compare-output mode. Other channels are untouched.
    pub fn set_output_mode(
        &mut self,
        id: TimerId,
        channel: Channel,
        mode: OutputMode,
    ) -> McalResult<()> {
        let bits = output::encode(id, channel, mode)?;
        trace!("{} output {:?} {:?}", id, channel, mode);
        id.layout().output[channel.index()].write(&mut self.bus, bits);
        Ok(())
    }

    /// Load the counter. 8-bit timers keep the low byte.
    pub fn set_counter(&mut self, id: TimerId, value: u16) {
        trace!("{} counter <- {}", id, value);
        self.write_counter(id, value);
    }

    /// Current counter value
    pub fn counter(&mut self, id: TimerId) -> u16 {
        let reg = id.layout().counter;
        match id.descriptor().width {
            Width::Bits8 => u16::from(self.bus.read(reg)),
            Width::Bits16 => self.bus.read_wide(reg),
        }
    }

    /// Load a compare register. 8-bit timers keep the low byte.
    pub fn set_compare(&mut self, id: TimerId, channel: Channel, value: u16) -> McalResult<()> {
        id.check_channel(channel)?;
        trace!("{} compare {:?} <- {}", id, channel, value);
        self.write_compare(id, channel, value);
        Ok(())
    }

    /// Current compare register value
    pub fn compare(&mut self, id: TimerId, channel: Channel) -> McalResult<u16> {
        id.check_channel(channel)?;
        let reg = id.layout().compare[channel.index()];
        Ok(match id.descriptor().width {
            Width::Bits8 => u16::from(self.bus.read(reg)),
            Width::Bits16 => self.bus.read_wide(reg),
        })
    }

    /// Write an 8-bit duty value into the compare register's low byte.
    ///
    /// On the 16-bit timer the high byte keeps whatever
    /// [`set_compare`](Self::set_compare) last put there (zero after reset).
    /// A lone low-byte write would commit the shared TEMP byte instead, so
    /// the high byte is read back directly and the pair is rewritten high
    /// first. That matches the 8-bit PWM submodes; use `set_compare` for
    /// full 16-bit values. The current waveform mode is not checked.
    pub fn set_duty_raw(&mut self, id: TimerId, channel: Channel, duty: u8) -> McalResult<()> {
        id.check_channel(channel)?;
        trace!("{} duty {:?} <- {}", id, channel, duty);
        let reg = id.layout().compare[channel.index()];
        match id.descriptor().width {
            Width::Bits8 => self.bus.write(reg, duty),
            Width::Bits16 => {
                let hi = self.bus.read(reg.high());
                self.bus.write_wide(reg, u16::from_le_bytes([duty, hi]));
            }
        }
        Ok(())
    }

    /// Enable exactly the sources in `enables`; other timers' enables are
    /// untouched. `compare_b` is ignored on single-channel timers.
    pub fn enable_interrupts(&mut self, id: TimerId, enables: Interrupts) {
        if enables.compare_b && id.descriptor().channels() < 2 {
            warn!("{} has no compare B interrupt", id);
        }
        trace!("{} irq {:?}", id, enables);
        irq::set_enables(&mut self.bus, id, enables);
    }

    /// Currently enabled sources
    pub fn interrupts(&mut self, id: TimerId) -> Interrupts {
        irq::enables(&mut self.bus, id)
    }

    /// Latched interrupt flags
    pub fn pending(&mut self, id: TimerId) -> Interrupts {
        irq::pending(&mut self.bus, id)
    }

    /// Clear latched flags; other timers' flags survive.
    pub fn clear_pending(&mut self, id: TimerId, flags: Interrupts) {
        irq::clear_pending(&mut self.bus, id, flags);
    }

    /// Decode the waveform field.
    ///
    /// Fails if the hardware holds a pattern with no logical mode, such as a
    /// 16-bit-top PWM submode programmed outside this driver.
    pub fn mode(&mut self, id: TimerId) -> McalResult<TimerMode> {
        let bits = id.layout().mode.read(&mut self.bus);
        mode::decode(id, bits)
    }

    /// Decode one channel's compare-output field
    pub fn output_mode(&mut self, id: TimerId, channel: Channel) -> McalResult<OutputMode> {
        id.check_channel(channel)?;
        output::decode(id.layout().output[channel.index()].read(&mut self.bus))
    }

    /// Clock selection currently in hardware
    pub fn clock(&mut self, id: TimerId) -> ClockSelect {
        ClockSelect::from_field(id.layout().clock.read(&mut self.bus))
    }

    pub fn state(&mut self, id: TimerId) -> TimerState {
        match self.clock(id) {
            cs if cs.is_stopped() => TimerState::Stopped,
            cs => TimerState::Running(cs),
        }
    }

    /// Borrow one channel as an `embedded-hal` PWM output
    pub fn pwm_channel(&mut self, id: TimerId, channel: Channel) -> McalResult<PwmChannel<'_, B>> {
        id.check_channel(channel)?;
        Ok(PwmChannel::new(self, id, channel))
    }

    fn write_counter(&mut self, id: TimerId, value: u16) {
        let reg = id.layout().counter;
        match id.descriptor().width {
            w @ Width::Bits8 => self.bus.write(reg, (value & w.mask()) as u8),
            Width::Bits16 => self.bus.write_wide(reg, value),
        }
    }

    fn write_compare(&mut self, id: TimerId, channel: Channel, value: u16) {
        let reg = id.layout().compare[channel.index()];
        match id.descriptor().width {
            w @ Width::Bits8 => self.bus.write(reg, (value & w.mask()) as u8),
            Width::Bits16 => self.bus.write_wide(reg, value),
        }
    }
}
