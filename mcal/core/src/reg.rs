//! Register addressing and the bus abstraction

use core::fmt;

/// Data-space address of an 8-bit I/O register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg(pub u16);

impl Reg {
    /// Raw data-space address
    pub const fn addr(self) -> u16 {
        self.0
    }

    /// Register one address above this one (high byte of a 16-bit pair)
    pub const fn high(self) -> Reg {
        Reg(self.0 + 1)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Reg {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=u16:#x}", self.0);
    }
}

/// A single bit inside a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bit {
    pub reg: Reg,
    pub pos: u8,
}

impl Bit {
    pub const fn new(reg: Reg, pos: u8) -> Self {
        Self { reg, pos }
    }

    /// Mask of this bit within its register
    pub const fn mask(self) -> u8 {
        1 << self.pos
    }
}

/// Synchronous access to the I/O register space.
///
/// Every method call is a bounded sequence of single-register transfers.
/// Only `read` and `write` are single transfers; the provided methods are
/// not atomic with respect to interrupt handlers touching the same
/// registers.
pub trait RegisterBus {
    /// Read one register
    fn read(&mut self, reg: Reg) -> u8;

    /// Write one register
    fn write(&mut self, reg: Reg, value: u8);

    /// Replace the bits selected by `mask` with those of `value`.
    ///
    /// One read followed by one write; bits outside `mask` are written back
    /// exactly as read.
    fn modify(&mut self, reg: Reg, mask: u8, value: u8) {
        let current = self.read(reg);
        self.write(reg, (current & !mask) | (value & mask));
    }

    /// Set or clear a single bit
    fn write_bit(&mut self, bit: Bit, set: bool) {
        self.modify(bit.reg, bit.mask(), if set { bit.mask() } else { 0 });
    }

    /// Read a 16-bit register pair whose low byte lives at `low`.
    ///
    /// The low byte is read first; on AVR this latches the high byte into
    /// the shared temporary register.
    fn read_wide(&mut self, low: Reg) -> u16 {
        let lo = self.read(low);
        let hi = self.read(low.high());
        u16::from_le_bytes([lo, hi])
    }

    /// Write a 16-bit register pair whose low byte lives at `low`.
    ///
    /// The high byte is written first; the low-byte write commits both.
    fn write_wide(&mut self, low: Reg, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(low.high(), hi);
        self.write(low, lo);
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read(&mut self, reg: Reg) -> u8 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Reg, value: u8) {
        (**self).write(reg, value)
    }
}
