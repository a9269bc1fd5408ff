//! Memory-mapped register bus for the real target

#![allow(unsafe_code)]

use crate::reg::{Reg, RegisterBus};

/// Bus over the microcontroller's memory-mapped I/O space.
///
/// Zero-sized; creating more than one is allowed because the hardware is the
/// only state. Callers own interrupt masking around multi-transfer
/// operations.
#[derive(Debug)]
pub struct MmioBus {
    _private: (),
}

impl MmioBus {
    /// # Safety
    ///
    /// Must only be used on a device whose data space matches the register
    /// addresses handed to the bus; every address is dereferenced as-is.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for MmioBus {
    #[inline(always)]
    fn read(&mut self, reg: Reg) -> u8 {
        // SAFETY: address validity is the contract of `MmioBus::new`
        unsafe { core::ptr::read_volatile(reg.addr() as usize as *const u8) }
    }

    #[inline(always)]
    fn write(&mut self, reg: Reg, value: u8) {
        // SAFETY: address validity is the contract of `MmioBus::new`
        unsafe { core::ptr::write_volatile(reg.addr() as usize as *mut u8, value) }
    }
}
