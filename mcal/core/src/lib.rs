#![no_std]
#![deny(unsafe_code)]

//! # MCAL Core
//!
//! Register access primitives shared by the MCAL peripheral drivers.
//!
//! Drivers never touch memory directly. Every transfer goes through a
//! [`RegisterBus`], which is either the real memory-mapped I/O space
//! ([`MmioBus`], feature `mmio`) or a hosted [`RegisterFile`] used to verify
//! field-level invariants without hardware.

#[cfg(feature = "std")]
extern crate std;

use core::fmt;

pub mod field;
pub mod file;
#[cfg(feature = "mmio")]
pub mod mmio;
pub mod reg;

pub use field::Field;
pub use file::{BusWrite, PairRead, RegisterFile, JOURNAL_DEPTH, TEMP_PAIRS};
#[cfg(feature = "mmio")]
pub use mmio::MmioBus;
pub use reg::{Bit, Reg, RegisterBus};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the MCAL drivers
pub type McalResult<T> = Result<T, McalError>;

/// Errors reported by MCAL driver operations.
///
/// Every error is raised before the first register transfer of the failing
/// operation, so hardware is never left half-configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McalError {
    /// Peripheral index outside the known set
    InvalidTimer { index: u8 },
    /// Channel does not exist on this peripheral
    InvalidChannel { timer: u8, channel: u8 },
    /// Raw channel code names no channel on any peripheral
    UnknownChannel { code: u8 },
    /// Raw mode code with no logical meaning
    UnsupportedMode { code: u8 },
    /// Waveform bits read back from hardware with no logical mode
    UnsupportedWaveform { timer: u8, bits: u8 },
    /// Raw output-compare code with no logical meaning
    UnsupportedOutputMode { code: u8 },
    /// Clock-select code does not fit the 3-bit field
    InvalidClock { code: u8 },
    /// No clock-select code produces this divisor on this peripheral
    UnsupportedDivisor { timer: u8, divisor: u16 },
}

impl fmt::Display for McalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McalError::InvalidTimer { index } => write!(f, "no timer with index {}", index),
            McalError::InvalidChannel { timer, channel } => {
                write!(f, "timer {} has no channel {}", timer, channel)
            }
            McalError::UnknownChannel { code } => write!(f, "no channel with code {}", code),
            McalError::UnsupportedMode { code } => write!(f, "unsupported mode code {}", code),
            McalError::UnsupportedWaveform { timer, bits } => {
                write!(f, "timer {} waveform bits {:#06b} have no logical mode", timer, bits)
            }
            McalError::UnsupportedOutputMode { code } => {
                write!(f, "unsupported output-compare code {}", code)
            }
            McalError::InvalidClock { code } => {
                write!(f, "clock-select code {} out of range", code)
            }
            McalError::UnsupportedDivisor { timer, divisor } => {
                write!(f, "timer {} cannot divide by {}", timer, divisor)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for McalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for McalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            McalError::InvalidTimer { index } => defmt::write!(fmt, "InvalidTimer({})", index),
            McalError::InvalidChannel { timer, channel } => {
                defmt::write!(fmt, "InvalidChannel({}, {})", timer, channel)
            }
            McalError::UnknownChannel { code } => defmt::write!(fmt, "UnknownChannel({})", code),
            McalError::UnsupportedMode { code } => defmt::write!(fmt, "UnsupportedMode({})", code),
            McalError::UnsupportedWaveform { timer, bits } => {
                defmt::write!(fmt, "UnsupportedWaveform({}, {=u8:b})", timer, bits)
            }
            McalError::UnsupportedOutputMode { code } => {
                defmt::write!(fmt, "UnsupportedOutputMode({})", code)
            }
            McalError::InvalidClock { code } => defmt::write!(fmt, "InvalidClock({})", code),
            McalError::UnsupportedDivisor { timer, divisor } => {
                defmt::write!(fmt, "UnsupportedDivisor({}, {})", timer, divisor)
            }
        }
    }
}
