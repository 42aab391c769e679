use shade::{Gameboy, MemoryLike};

mod common;
use common::{bcd, boot, cartridge, from_bcd};

const PROGRAM_START: u16 = 0xC000;

fn init() -> Gameboy {
    Gameboy::new(&boot(&[]), cartridge(0x00, 2)).unwrap()
}

/// Copies `program` into work RAM and runs `steps` instructions of it.
fn exec(gb: &mut Gameboy, program: &[u8], steps: usize) {
    for (addr, byte) in (PROGRAM_START..).zip(program) {
        gb.mem.write_byte(addr, *byte).unwrap();
    }
    gb.cpu.pc = PROGRAM_START;
    for _ in 0..steps {
        gb.step().unwrap();
    }
}

#[test]
fn decimal_adjust_after_add() {
    let mut gb = init();
    for p in 0..100u8 {
        for q in 0..100u8 {
            // LD A, p; ADD A, q; DAA
            exec(&mut gb, &[0x3E, bcd(p), 0xC6, bcd(q), 0x27], 3);
            let sum = p as u16 + q as u16;
            assert_eq!(from_bcd(gb.cpu.a) as u16, sum % 100, "{p} + {q}");
            assert_eq!(gb.cpu.carry_flag(), sum >= 100, "{p} + {q}");
            assert_eq!(gb.cpu.zero_flag(), sum % 100 == 0, "{p} + {q}");
            assert!(!gb.cpu.half_carry_flag());
            assert!(!gb.cpu.subtraction_flag());
        }
    }
}

#[test]
fn decimal_adjust_after_sub() {
    let mut gb = init();
    for p in 0..100u8 {
        for q in 0..100u8 {
            // LD A, p; SUB q; DAA
            exec(&mut gb, &[0x3E, bcd(p), 0xD6, bcd(q), 0x27], 3);
            let diff = (p as u16 + 100 - q as u16) % 100;
            assert_eq!(from_bcd(gb.cpu.a) as u16, diff, "{p} - {q}");
            assert_eq!(gb.cpu.carry_flag(), p < q, "{p} - {q}");
            assert!(gb.cpu.subtraction_flag());
        }
    }
}

#[test]
fn multi_byte_bcd_add() {
    let mut gb = init();
    // 4719 + 5382 = 10101, computed one byte at a time with ADC carrying between them
    // LD A, 0x19; ADD A, 0x82; DAA; LD B, A; LD A, 0x47; ADC A, 0x53; DAA
    exec(
        &mut gb,
        &[0x3E, 0x19, 0xC6, 0x82, 0x27, 0x47, 0x3E, 0x47, 0xCE, 0x53, 0x27],
        7,
    );
    assert_eq!(gb.cpu.bc.hi(), 0x01);
    assert_eq!(gb.cpu.a, 0x01);
    assert!(gb.cpu.carry_flag());
}

#[test]
fn swap_through_hl() {
    let mut gb = init();
    gb.mem.write_byte(0xD000, 0xA5).unwrap();
    // LD HL, 0xD000; SWAP (HL)
    exec(&mut gb, &[0x21, 0x00, 0xD0, 0xCB, 0x36], 2);
    assert_eq!(gb.read(0xD000), 0x5A);
    assert!(!gb.cpu.zero_flag());
}

#[test]
fn stack_round_trip_in_high_ram() {
    let mut gb = init();
    // LD SP, 0xFFFE; LD BC, 0x1234; PUSH BC; POP DE
    exec(&mut gb, &[0x31, 0xFE, 0xFF, 0x01, 0x34, 0x12, 0xC5, 0xD1], 4);
    assert_eq!(gb.cpu.de.get(), 0x1234);
    assert_eq!(gb.cpu.sp, 0xFFFE);
    assert_eq!(gb.read(0xFFFD), 0x12);
    assert_eq!(gb.read(0xFFFC), 0x34);
}
