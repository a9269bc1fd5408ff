//! Register bus behaviour seen from outside the crate

use mcal_core::{Bit, Field, McalError, Reg, RegisterBus, RegisterFile, JOURNAL_DEPTH};

/// Bus that counts transfers on top of a register file
struct CountingBus {
    file: RegisterFile,
    reads: usize,
    writes: usize,
}

impl RegisterBus for CountingBus {
    fn read(&mut self, reg: Reg) -> u8 {
        self.reads += 1;
        self.file.read(reg)
    }

    fn write(&mut self, reg: Reg, value: u8) {
        self.writes += 1;
        self.file.write(reg, value)
    }
}

const HI: Reg = Reg(0x4F);
const LO: Reg = Reg(0x4E);
const WGM: [Bit; 4] = [Bit::new(HI, 0), Bit::new(HI, 1), Bit::new(LO, 3), Bit::new(LO, 4)];
static MODE: Field = Field::new(&WGM);

fn counting() -> CountingBus {
    CountingBus {
        file: RegisterFile::new(),
        reads: 0,
        writes: 0,
    }
}

#[test]
fn test_modify_is_one_read_one_write() {
    let mut bus = counting();
    bus.modify(LO, 0x0F, 0xFF);
    assert_eq!((bus.reads, bus.writes), (1, 1));
    assert_eq!(bus.file.peek(LO), 0x0F);
}

#[test]
fn test_split_field_transfers() {
    let mut bus = counting();
    MODE.write(&mut bus, 0b1111);
    assert_eq!((bus.reads, bus.writes), (2, 2));
    assert_eq!(MODE.read(&mut bus), 0b1111);
    assert_eq!((bus.reads, bus.writes), (4, 2));
}

#[test]
fn test_wide_access_is_two_transfers() {
    let mut bus = counting();
    bus.write_wide(Reg(0x4A), 0x0102);
    assert_eq!(bus.writes, 2);
    assert_eq!(bus.read_wide(Reg(0x4A)), 0x0102);
    assert_eq!(bus.reads, 2);
}

#[test]
fn test_borrowed_bus_forwards() {
    let mut file = RegisterFile::new();
    {
        let mut borrowed = &mut file;
        borrowed.write_bit(Bit::new(Reg(0x37), 3), true);
        MODE.write(&mut borrowed, 0b0101);
    }
    assert_eq!(file.peek(Reg(0x37)), 0b0000_1000);
    assert_eq!(file.peek(HI), 0b01);
    assert_eq!(file.peek(LO), 0b0000_1000);
}

#[test]
fn test_journal_keeps_first_writes() {
    let mut file = RegisterFile::new();
    for i in 0..(JOURNAL_DEPTH + 8) {
        file.write(Reg(0x40), i as u8);
    }
    assert_eq!(file.journal().len(), JOURNAL_DEPTH);
    assert_eq!(file.journal()[0].value, 0);
    assert_eq!(file.peek(Reg(0x40)), (JOURNAL_DEPTH + 7) as u8);
}

#[test]
fn test_error_messages() {
    let err = McalError::UnsupportedDivisor {
        timer: 0,
        divisor: 32,
    };
    assert_eq!(format!("{}", err), "timer 0 cannot divide by 32");
    assert_eq!(
        format!("{}", McalError::InvalidChannel { timer: 2, channel: 1 }),
        "timer 2 has no channel 1"
    );
}
