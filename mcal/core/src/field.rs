//! Named bit groups inside control registers
//!
//! A [`Field`] is an ordered list of bits, least significant first. The bits
//! need not be contiguous and may live in more than one register, which is
//! how AVR waveform-generation fields are laid out.

use crate::reg::{Bit, Reg, RegisterBus};

/// Logical bit group spread over one or more registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    bits: &'static [Bit],
}

impl Field {
    /// Create a field from its bits, least significant first.
    pub const fn new(bits: &'static [Bit]) -> Self {
        Self { bits }
    }

    /// The field's bits, least significant first
    pub const fn bits(&self) -> &'static [Bit] {
        self.bits
    }

    /// Number of bits in the field
    pub const fn width(&self) -> u8 {
        self.bits.len() as u8
    }

    /// Largest value the field can hold
    pub const fn max(&self) -> u8 {
        ((1u16 << self.bits.len()) - 1) as u8
    }

    /// Mask of the field's bits that live in `reg`
    pub fn mask_in(&self, reg: Reg) -> u8 {
        self.bits
            .iter()
            .filter(|bit| bit.reg == reg)
            .fold(0, |mask, bit| mask | bit.mask())
    }

    /// Physical bits of `value` that land in `reg`
    pub fn encode_in(&self, reg: Reg, value: u8) -> u8 {
        self.bits
            .iter()
            .enumerate()
            .filter(|(i, bit)| bit.reg == reg && value & (1 << *i) != 0)
            .fold(0, |acc, (_, bit)| acc | bit.mask())
    }

    /// Gather this field's bits out of a raw value of `reg`
    pub fn decode_from(&self, reg: Reg, raw: u8) -> u8 {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, bit)| bit.reg == reg && raw & bit.mask() != 0)
            .fold(0, |acc, (i, _)| acc | (1 << i))
    }

    /// Distinct registers holding this field, in first-use order
    pub fn registers(&self) -> impl Iterator<Item = Reg> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(i, bit)| !self.bits[..*i].iter().any(|prev| prev.reg == bit.reg))
            .map(|(_, bit)| bit.reg)
    }

    /// Read the field. Each register holding it is read exactly once.
    pub fn read<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> u8 {
        self.registers()
            .fold(0, |acc, reg| acc | self.decode_from(reg, bus.read(reg)))
    }

    /// Write the field with one read-modify-write per register holding it.
    ///
    /// Bits of `value` above the field width are ignored. Every bit outside
    /// the field keeps its value.
    pub fn write<B: RegisterBus + ?Sized>(&self, bus: &mut B, value: u8) {
        let value = value & self.max();
        for reg in self.registers() {
            bus.modify(reg, self.mask_in(reg), self.encode_in(reg, value));
        }
    }

    /// True when no bit is shared with `other`
    pub fn is_disjoint(&self, other: &Field) -> bool {
        self.bits.iter().all(|bit| !other.bits.contains(bit))
    }
}
