//! Interrupt enable and flag control
//!
//! TIMSK and TIFR are shared by all three timers. Enables are updated with a
//! single read-modify-write restricted to the target timer's bits; flags are
//! write-one-to-clear, so clearing is a plain write of the bits to clear.

use mcal_core::RegisterBus;

use crate::layout::{Channel, TimerId, TIFR, TIMSK};

/// The three logical interrupt sources of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterruptSource {
    Overflow,
    Compare(Channel),
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptSource {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            InterruptSource::Overflow => defmt::write!(fmt, "Overflow"),
            InterruptSource::Compare(ch) => defmt::write!(fmt, "Compare({})", ch),
        }
    }
}

/// One flag per logical interrupt source, used both for enables and for
/// pending flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interrupts {
    pub overflow: bool,
    pub compare_a: bool,
    pub compare_b: bool,
}

impl Interrupts {
    pub const NONE: Interrupts = Interrupts {
        overflow: false,
        compare_a: false,
        compare_b: false,
    };

    pub const ALL: Interrupts = Interrupts {
        overflow: true,
        compare_a: true,
        compare_b: true,
    };

    pub const fn new(overflow: bool, compare_a: bool, compare_b: bool) -> Self {
        Self {
            overflow,
            compare_a,
            compare_b,
        }
    }

    /// Flag for `source`
    pub const fn contains(&self, source: InterruptSource) -> bool {
        match source {
            InterruptSource::Overflow => self.overflow,
            InterruptSource::Compare(Channel::A) => self.compare_a,
            InterruptSource::Compare(Channel::B) => self.compare_b,
        }
    }

    pub const fn is_empty(&self) -> bool {
        !(self.overflow || self.compare_a || self.compare_b)
    }

    /// Register bits of `id` set for these flags, and the mask of all of
    /// `id`'s bits. Channels the timer lacks contribute nothing.
    fn bits(&self, id: TimerId) -> (u8, u8) {
        let layout = id.layout();
        let mut mask = 1 << layout.overflow_bit;
        let mut value = if self.overflow { mask } else { 0 };
        for (ch, &pos) in layout.compare_bits.iter().enumerate() {
            let bit = 1 << pos;
            mask |= bit;
            let wanted = if ch == Channel::A.index() {
                self.compare_a
            } else {
                self.compare_b
            };
            if wanted {
                value |= bit;
            }
        }
        (mask, value)
    }

    /// Decode `id`'s flags out of a raw TIMSK/TIFR value
    fn from_bits(id: TimerId, raw: u8) -> Self {
        let layout = id.layout();
        let has = |pos: Option<&u8>| pos.is_some_and(|&p| raw & (1 << p) != 0);
        Self {
            overflow: raw & (1 << layout.overflow_bit) != 0,
            compare_a: has(layout.compare_bits.get(Channel::A.index())),
            compare_b: has(layout.compare_bits.get(Channel::B.index())),
        }
    }
}

/// Enable exactly the sources in `enables` for `id`.
///
/// One read and one write of TIMSK; bits of other timers, and TICIE1, are
/// written back unchanged.
pub fn set_enables<B: RegisterBus + ?Sized>(bus: &mut B, id: TimerId, enables: Interrupts) {
    let (mask, value) = enables.bits(id);
    bus.modify(TIMSK, mask, value);
}

/// Sources currently enabled for `id`
pub fn enables<B: RegisterBus + ?Sized>(bus: &mut B, id: TimerId) -> Interrupts {
    Interrupts::from_bits(id, bus.read(TIMSK))
}

/// Sources of `id` whose flag is latched in TIFR
pub fn pending<B: RegisterBus + ?Sized>(bus: &mut B, id: TimerId) -> Interrupts {
    Interrupts::from_bits(id, bus.read(TIFR))
}

/// Clear the latched flags of `id` named in `flags`.
///
/// A single write. Zero bits do not affect the flag register, so other
/// timers' pending flags survive without a read-modify-write.
pub fn clear_pending<B: RegisterBus + ?Sized>(bus: &mut B, id: TimerId, flags: Interrupts) {
    let (_, value) = flags.bits(id);
    if value != 0 {
        bus.write(TIFR, value);
    }
}
