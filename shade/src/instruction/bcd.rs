use super::*;

use crate::cpu::Flags;

/// One row of the decimal adjust tables. A row applies when the carry and half carry flags match
/// and both nibbles of A fall inside the given (inclusive) ranges.
#[derive(Debug, Clone, Copy)]
struct Correction {
    carry: bool,
    high: (u8, u8),
    half: bool,
    low: (u8, u8),
    adjust: u8,
    carry_out: bool,
}

impl Correction {
    const fn new(
        carry: bool,
        high: (u8, u8),
        half: bool,
        low: (u8, u8),
        adjust: u8,
        carry_out: bool,
    ) -> Self {
        Self {
            carry,
            high,
            half,
            low,
            adjust,
            carry_out,
        }
    }

    fn applies(&self, a: u8, flags: &Flags) -> bool {
        let (hi, lo) = (a >> 4, a & 0x0F);
        self.carry == flags.c
            && self.half == flags.h
            && (self.high.0..=self.high.1).contains(&hi)
            && (self.low.0..=self.low.1).contains(&lo)
    }
}

/// Corrections after an addition (N clear).
static AFTER_ADD: [Correction; 9] = [
    Correction::new(false, (0x0, 0x9), false, (0x0, 0x9), 0x00, false),
    Correction::new(false, (0x0, 0x8), false, (0xA, 0xF), 0x06, false),
    Correction::new(false, (0x0, 0x9), true, (0x0, 0x3), 0x06, false),
    Correction::new(false, (0xA, 0xF), false, (0x0, 0x9), 0x60, true),
    Correction::new(false, (0x9, 0xF), false, (0xA, 0xF), 0x66, true),
    Correction::new(false, (0xA, 0xF), true, (0x0, 0x3), 0x66, true),
    Correction::new(true, (0x0, 0x2), false, (0x0, 0x9), 0x60, true),
    Correction::new(true, (0x0, 0x2), false, (0xA, 0xF), 0x66, true),
    Correction::new(true, (0x0, 0x3), true, (0x0, 0x3), 0x66, true),
];

/// Corrections after a subtraction (N set).
static AFTER_SUB: [Correction; 4] = [
    Correction::new(false, (0x0, 0x9), false, (0x0, 0x9), 0x00, false),
    Correction::new(false, (0x0, 0x8), true, (0x6, 0xF), 0xFA, false),
    Correction::new(true, (0x7, 0xF), false, (0x0, 0x9), 0xA0, true),
    Correction::new(true, (0x6, 0xF), true, (0x6, 0xF), 0x9A, true),
];

/// Corrects A after a binary addition or subtraction of two packed BCD values so that it holds the
/// packed BCD result. The N flag picks the table. Z and C are set from the correction, H is
/// cleared, and N is kept.
///
/// An accumulator that no table row covers cannot have come from BCD operands and is fatal.
pub fn decimal_adjust(a: u8, flags: &mut Flags) -> Result<u8, Fatal> {
    let table: &[Correction] = if flags.n { &AFTER_SUB } else { &AFTER_ADD };
    let row = table
        .iter()
        .find(|row| row.applies(a, flags))
        .ok_or(Fatal::DecimalAdjust {
            a,
            flags: flags.as_byte(),
        })?;
    let result = a.wrapping_add(row.adjust);
    flags.z = result == 0;
    flags.h = false;
    flags.c = row.carry_out;
    Ok(result)
}
