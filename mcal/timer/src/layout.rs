//! Register layout table for the three timer/counter peripherals
//!
//! This is the only place that has to match the silicon. Every operation in
//! the crate dispatches on [`TimerId`] and reads its addresses, bit
//! positions and translation tables from the [`TimerDescriptor`] below; no
//! operation carries its own per-timer register knowledge.
//!
//! Addresses are ATmega32 data-space addresses.

use core::fmt;

use mcal_core::{Bit, Field, McalError, McalResult, PairRead, Reg, RegisterFile};

use crate::clock::{ClockSource, CLOCKS_SYNC, CLOCKS_TIMER2};
use crate::mode::{TimerMode, WGM_16BIT, WGM_8BIT};

// Timer/Counter0
pub const TCCR0: Reg = Reg(0x53);
pub const TCNT0: Reg = Reg(0x52);
pub const OCR0: Reg = Reg(0x5C);

// Timer/Counter1 (16-bit pairs are addressed by their low byte)
pub const TCCR1A: Reg = Reg(0x4F);
pub const TCCR1B: Reg = Reg(0x4E);
pub const TCNT1: Reg = Reg(0x4C);
pub const OCR1A: Reg = Reg(0x4A);
pub const OCR1B: Reg = Reg(0x48);

// Timer/Counter2
pub const TCCR2: Reg = Reg(0x45);
pub const TCNT2: Reg = Reg(0x44);
pub const OCR2: Reg = Reg(0x43);

// Shared by all three timers
pub const TIMSK: Reg = Reg(0x59);
pub const TIFR: Reg = Reg(0x58);

// Port data-direction registers holding the compare output pins
pub const DDRB: Reg = Reg(0x37);
pub const DDRD: Reg = Reg(0x31);

/// One of the three timer/counter peripherals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// 8-bit Timer/Counter0, one compare channel
    Timer0,
    /// 16-bit Timer/Counter1, compare channels A and B
    Timer1,
    /// 8-bit Timer/Counter2, one compare channel, own prescaler table
    Timer2,
}

impl TimerId {
    /// All timers, in index order
    pub const ALL: [TimerId; 3] = [TimerId::Timer0, TimerId::Timer1, TimerId::Timer2];

    /// Index used for hook slots and error reports
    pub const fn index(self) -> u8 {
        match self {
            TimerId::Timer0 => 0,
            TimerId::Timer1 => 1,
            TimerId::Timer2 => 2,
        }
    }

    /// Static description of this timer's hardware
    pub fn descriptor(self) -> &'static TimerDescriptor {
        match self {
            TimerId::Timer0 => &TIMER0,
            TimerId::Timer1 => &TIMER1,
            TimerId::Timer2 => &TIMER2,
        }
    }

    /// Register layout of this timer
    pub fn layout(self) -> &'static RegisterLayout {
        self.descriptor().layout
    }

    /// Fail unless this timer has `channel`
    pub fn check_channel(self, channel: Channel) -> McalResult<()> {
        if channel.index() < self.descriptor().channels() {
            Ok(())
        } else {
            Err(McalError::InvalidChannel {
                timer: self.index(),
                channel: channel.index() as u8,
            })
        }
    }
}

impl TryFrom<u8> for TimerId {
    type Error = McalError;

    fn try_from(index: u8) -> McalResult<Self> {
        match index {
            0 => Ok(TimerId::Timer0),
            1 => Ok(TimerId::Timer1),
            2 => Ok(TimerId::Timer2),
            _ => Err(McalError::InvalidTimer { index }),
        }
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer{}", self.index())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Timer{}", self.index());
    }
}

/// Output-compare channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    A,
    B,
}

impl Channel {
    pub const fn index(self) -> usize {
        match self {
            Channel::A => 0,
            Channel::B => 1,
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = McalError;

    fn try_from(code: u8) -> McalResult<Self> {
        match code {
            0 => Ok(Channel::A),
            1 => Ok(Channel::B),
            _ => Err(McalError::UnknownChannel { code }),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Channel {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Channel::A => defmt::write!(fmt, "A"),
            Channel::B => defmt::write!(fmt, "B"),
        }
    }
}

/// Counter and compare register width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Bits8,
    Bits16,
}

impl Width {
    /// Mask applied to counter/compare values of this width
    pub const fn mask(self) -> u16 {
        match self {
            Width::Bits8 => 0x00FF,
            Width::Bits16 => 0xFFFF,
        }
    }
}

/// Addresses and bit positions of one timer's registers.
///
/// Invariant: `clock` is exactly 3 bits wide and shares no bit with `mode`
/// or any `output` field.
#[derive(Debug)]
pub struct RegisterLayout {
    /// Control registers, in the order the datasheet lists them
    pub control: &'static [Reg],
    /// Counter register (low byte for 16-bit timers)
    pub counter: Reg,
    /// Compare register per channel (low byte for 16-bit timers)
    pub compare: &'static [Reg],
    /// Waveform-generation field
    pub mode: Field,
    /// Compare-output field per channel
    pub output: &'static [Field],
    /// Clock-select field
    pub clock: Field,
    /// Data-direction bit of each channel's output pin
    pub pins: &'static [Bit],
    /// Overflow bit position in TIMSK/TIFR
    pub overflow_bit: u8,
    /// Compare-match bit position per channel in TIMSK/TIFR
    pub compare_bits: &'static [u8],
}

/// Build-time description of one physical timer.
#[derive(Debug)]
pub struct TimerDescriptor {
    pub id: TimerId,
    pub width: Width,
    pub layout: &'static RegisterLayout,
    /// Logical mode to waveform bits, for the modes this timer supports
    pub modes: &'static [(TimerMode, u8)],
    /// Clock source selected by each 3-bit code
    pub clocks: &'static [ClockSource; 8],
}

impl TimerDescriptor {
    /// Number of output-compare channels
    pub const fn channels(&self) -> usize {
        self.layout.compare.len()
    }
}

const fn bit(reg: Reg, pos: u8) -> Bit {
    Bit::new(reg, pos)
}

// Timer0: TCCR0 = FOC0 WGM00 COM01 COM00 WGM01 CS02 CS01 CS00
const T0_MODE: [Bit; 2] = [bit(TCCR0, 6), bit(TCCR0, 3)];
const T0_COM: [Bit; 2] = [bit(TCCR0, 4), bit(TCCR0, 5)];
const T0_CS: [Bit; 3] = [bit(TCCR0, 0), bit(TCCR0, 1), bit(TCCR0, 2)];
const T0_OUTPUT: [Field; 1] = [Field::new(&T0_COM)];
const T0_PINS: [Bit; 1] = [bit(DDRB, 3)];

// Timer1: TCCR1A = COM1A1 COM1A0 COM1B1 COM1B0 FOC1A FOC1B WGM11 WGM10
//         TCCR1B = ICNC1 ICES1 - WGM13 WGM12 CS12 CS11 CS10
const T1_MODE: [Bit; 4] = [bit(TCCR1A, 0), bit(TCCR1A, 1), bit(TCCR1B, 3), bit(TCCR1B, 4)];
const T1_COM_A: [Bit; 2] = [bit(TCCR1A, 6), bit(TCCR1A, 7)];
const T1_COM_B: [Bit; 2] = [bit(TCCR1A, 4), bit(TCCR1A, 5)];
const T1_CS: [Bit; 3] = [bit(TCCR1B, 0), bit(TCCR1B, 1), bit(TCCR1B, 2)];
const T1_OUTPUT: [Field; 2] = [Field::new(&T1_COM_A), Field::new(&T1_COM_B)];
const T1_PINS: [Bit; 2] = [bit(DDRD, 5), bit(DDRD, 4)];

// Timer2: TCCR2 = FOC2 WGM20 COM21 COM20 WGM21 CS22 CS21 CS20
const T2_MODE: [Bit; 2] = [bit(TCCR2, 6), bit(TCCR2, 3)];
const T2_COM: [Bit; 2] = [bit(TCCR2, 4), bit(TCCR2, 5)];
const T2_CS: [Bit; 3] = [bit(TCCR2, 0), bit(TCCR2, 1), bit(TCCR2, 2)];
const T2_OUTPUT: [Field; 1] = [Field::new(&T2_COM)];
const T2_PINS: [Bit; 1] = [bit(DDRD, 7)];

const T0_CONTROL: [Reg; 1] = [TCCR0];
const T1_CONTROL: [Reg; 2] = [TCCR1A, TCCR1B];
const T2_CONTROL: [Reg; 1] = [TCCR2];

const T0_COMPARE: [Reg; 1] = [OCR0];
const T1_COMPARE: [Reg; 2] = [OCR1A, OCR1B];
const T2_COMPARE: [Reg; 1] = [OCR2];

// TIMSK/TIFR: OCF2/OCIE2 TOV2/TOIE2 ICF1/TICIE1 OCF1A OCF1B TOV1 OCF0 TOV0
const T0_COMPARE_BITS: [u8; 1] = [1];
const T1_COMPARE_BITS: [u8; 2] = [4, 3];
const T2_COMPARE_BITS: [u8; 1] = [7];

static LAYOUT0: RegisterLayout = RegisterLayout {
    control: &T0_CONTROL,
    counter: TCNT0,
    compare: &T0_COMPARE,
    mode: Field::new(&T0_MODE),
    output: &T0_OUTPUT,
    clock: Field::new(&T0_CS),
    pins: &T0_PINS,
    overflow_bit: 0,
    compare_bits: &T0_COMPARE_BITS,
};

static LAYOUT1: RegisterLayout = RegisterLayout {
    control: &T1_CONTROL,
    counter: TCNT1,
    compare: &T1_COMPARE,
    mode: Field::new(&T1_MODE),
    output: &T1_OUTPUT,
    clock: Field::new(&T1_CS),
    pins: &T1_PINS,
    overflow_bit: 2,
    compare_bits: &T1_COMPARE_BITS,
};

static LAYOUT2: RegisterLayout = RegisterLayout {
    control: &T2_CONTROL,
    counter: TCNT2,
    compare: &T2_COMPARE,
    mode: Field::new(&T2_MODE),
    output: &T2_OUTPUT,
    clock: Field::new(&T2_CS),
    pins: &T2_PINS,
    overflow_bit: 6,
    compare_bits: &T2_COMPARE_BITS,
};

static TIMER0: TimerDescriptor = TimerDescriptor {
    id: TimerId::Timer0,
    width: Width::Bits8,
    layout: &LAYOUT0,
    modes: &WGM_8BIT,
    clocks: &CLOCKS_SYNC,
};

static TIMER1: TimerDescriptor = TimerDescriptor {
    id: TimerId::Timer1,
    width: Width::Bits16,
    layout: &LAYOUT1,
    modes: &WGM_16BIT,
    clocks: &CLOCKS_SYNC,
};

static TIMER2: TimerDescriptor = TimerDescriptor {
    id: TimerId::Timer2,
    width: Width::Bits8,
    layout: &LAYOUT2,
    modes: &WGM_8BIT,
    clocks: &CLOCKS_TIMER2,
};

/// Hosted register file wired like the ATmega32 timer block.
///
/// TIFR flags are write-one-to-clear, and the Timer1 counter and compare
/// pairs share the TEMP byte. Use this rather than a bare
/// [`RegisterFile::new`] whenever flag or 16-bit behaviour matters.
pub fn register_file() -> RegisterFile {
    RegisterFile::new()
        .with_write_one_to_clear(TIFR, 0xFF)
        .with_temp_pair(TCNT1, PairRead::Latched)
        .with_temp_pair(OCR1A, PairRead::Direct)
        .with_temp_pair(OCR1B, PairRead::Direct)
}
