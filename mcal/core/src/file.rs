//! Hosted register file
//!
//! Stands in for the I/O register space when running on a host. The layout
//! follows the AVR data space:
//!
//! | Address Range | Content                     |
//! |---------------|-----------------------------|
//! | 0x0000–0x001F | General registers R0–R31    |
//! | 0x0020–0x005F | I/O registers               |
//!
//! Every location starts at its reset default of zero. Bus writes are
//! journaled so tests can inspect the exact transfer sequence of an
//! operation, including states that are only visible between transfers.
//!
//! 16-bit register pairs can be routed through one shared TEMP byte, as on
//! the AVR: a high-byte write only loads TEMP, and the low-byte write
//! commits TEMP to the high byte. A code path that writes a low byte alone
//! therefore picks up whatever TEMP holds, exactly as the silicon does.

use heapless::Vec;

use crate::reg::{Reg, RegisterBus};

/// End of the emulated data space (exclusive)
pub const IO_END: usize = 0x60;

/// Number of bus writes kept in the journal
pub const JOURNAL_DEPTH: usize = 64;

/// Number of 16-bit pairs that can share the TEMP byte
pub const TEMP_PAIRS: usize = 4;

/// Read behaviour of a TEMP-buffered register pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRead {
    /// Reading the low byte latches the high byte into TEMP, and the high
    /// address then reads TEMP (counter and capture registers)
    Latched,
    /// Both bytes are read directly (compare registers)
    Direct,
}

/// One journaled bus write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusWrite {
    pub reg: Reg,
    pub value: u8,
}

/// In-memory register space with reset-default contents.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    data: [u8; IO_END],
    /// Bits that clear when written with one (interrupt flag registers)
    w1c: [u8; IO_END],
    journal: Vec<BusWrite, JOURNAL_DEPTH>,
    /// Pairs sharing `temp`, by low-byte address
    pairs: Vec<(Reg, PairRead), TEMP_PAIRS>,
    temp: u8,
}

impl RegisterFile {
    /// Register file in its power-on reset state
    pub const fn new() -> Self {
        Self {
            data: [0; IO_END],
            w1c: [0; IO_END],
            journal: Vec::new(),
            pairs: Vec::new(),
            temp: 0,
        }
    }

    /// Mark `mask` bits of `reg` as write-one-to-clear.
    pub fn with_write_one_to_clear(mut self, reg: Reg, mask: u8) -> Self {
        if let Some(slot) = self.w1c.get_mut(reg.addr() as usize) {
            *slot |= mask;
        }
        self
    }

    /// Route the pair whose low byte is `low` through the shared TEMP byte.
    ///
    /// At most [`TEMP_PAIRS`] pairs; further ones are ignored.
    pub fn with_temp_pair(mut self, low: Reg, read: PairRead) -> Self {
        let _ = self.pairs.push((low, read));
        self
    }

    /// Current content of the shared TEMP byte
    pub fn temp(&self) -> u8 {
        self.temp
    }

    /// Read a register without going through the bus
    pub fn peek(&self, reg: Reg) -> u8 {
        self.data.get(reg.addr() as usize).copied().unwrap_or(0)
    }

    /// Store a register without going through the bus.
    ///
    /// Simulates hardware-side activity (counting, flag latching, writes by
    /// code outside the driver). Not journaled.
    pub fn poke(&mut self, reg: Reg, value: u8) {
        if let Some(slot) = self.data.get_mut(reg.addr() as usize) {
            *slot = value;
        }
    }

    /// Bus writes since the last [`clear_journal`](Self::clear_journal).
    ///
    /// Holds the first [`JOURNAL_DEPTH`] writes; later ones are dropped.
    pub fn journal(&self) -> &[BusWrite] {
        &self.journal
    }

    /// Forget all journaled writes
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for RegisterFile {
    fn read(&mut self, reg: Reg) -> u8 {
        match self.pair(reg) {
            Some((low, PairRead::Latched)) if reg == low => {
                self.temp = self.peek(low.high());
                self.peek(low)
            }
            Some((_, PairRead::Latched)) => self.temp,
            _ => self.peek(reg),
        }
    }

    fn write(&mut self, reg: Reg, value: u8) {
        // Journal is best effort once full
        let _ = self.journal.push(BusWrite { reg, value });

        match self.pair(reg) {
            Some((low, _)) if reg == low.high() => {
                self.temp = value;
                return;
            }
            Some((low, _)) => self.store(low.high(), self.temp),
            None => {}
        }
        self.store(reg, value);
    }
}

impl RegisterFile {
    /// Pair containing `reg`, as either its low or high byte
    fn pair(&self, reg: Reg) -> Option<(Reg, PairRead)> {
        self.pairs
            .iter()
            .copied()
            .find(|(low, _)| reg == *low || reg == low.high())
    }

    /// Bus-side store with write-one-to-clear applied
    fn store(&mut self, reg: Reg, value: u8) {
        let addr = reg.addr() as usize;
        if addr >= IO_END {
            return;
        }
        let w1c = self.w1c[addr];
        let plain = (self.data[addr] & w1c) | (value & !w1c);
        self.data[addr] = plain & !(value & w1c);
    }
}
