#![no_std]
#![deny(unsafe_code)]

//! # MCAL Timer
//!
//! One logical driver for the three ATmega32 timer/counters:
//!
//! | Timer | Width | Channels | Clock table |
//! |-------|-------|----------|-------------|
//! | 0 | 8-bit | A | 1, 8, 64, 256, 1024, external |
//! | 1 | 16-bit | A, B | 1, 8, 64, 256, 1024, external |
//! | 2 | 8-bit | A | 1, 8, 32, 64, 128, 256, 1024 |
//!
//! Mode, clock, compare-output and interrupt settings are expressed once
//! and translated per timer through a static layout table. All hardware
//! access goes through a [`mcal_core::RegisterBus`].
//!
//! ```
//! use mcal_timer::layout::register_file;
//! use mcal_timer::{Channel, TimerConfig, TimerId, TimerMode, Timers};
//!
//! let mut timers = Timers::new(register_file());
//! let config = TimerConfig::pwm(TimerId::Timer1)?.with_compare(Channel::A, 128);
//! timers.init(&config)?;
//!
//! assert_eq!(timers.mode(TimerId::Timer1)?, TimerMode::FastPwm);
//! assert_eq!(timers.compare(TimerId::Timer1, Channel::A)?, 128);
//! # Ok::<(), mcal_core::McalError>(())
//! ```

#[cfg(feature = "std")]
extern crate std;

pub mod clock;
pub mod config;
pub mod driver;
pub mod hook;
pub mod irq;
pub mod layout;
pub mod mode;
pub mod output;
pub mod pwm;

pub use clock::{ClockSelect, ClockSource};
pub use config::TimerConfig;
pub use driver::{TimerState, Timers};
pub use hook::{HookTable, TimerCallback, TimerEvent, HOOKS};
pub use irq::{InterruptSource, Interrupts};
pub use layout::{Channel, TimerDescriptor, TimerId, Width};
pub use mcal_core::{McalError, McalResult};
pub use mode::TimerMode;
pub use output::OutputMode;
pub use pwm::{PwmChannel, PwmError, MAX_DUTY};
