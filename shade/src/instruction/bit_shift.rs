use super::*;

use crate::cpu::check_bit;

/// The rotate and shift operations of the 0xCB block, selected by bits 3 through 5.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
pub enum ShiftOp {
    #[display("RLC")]
    Rlc,
    #[display("RRC")]
    Rrc,
    #[display("RL")]
    Rl,
    #[display("RR")]
    Rr,
    #[display("SLA")]
    Sla,
    #[display("SRA")]
    Sra,
    #[display("SWAP")]
    Swap,
    #[display("SRL")]
    Srl,
}

impl ShiftOp {
    pub const fn from_field(field: u8) -> Self {
        match field & 0x7 {
            0 => Self::Rlc,
            1 => Self::Rrc,
            2 => Self::Rl,
            3 => Self::Rr,
            4 => Self::Sla,
            5 => Self::Sra,
            6 => Self::Swap,
            _ => Self::Srl,
        }
    }

    /// Returns the shifted byte and the carry out. `carry` is the incoming carry flag, which only
    /// the through-carry rotates consume.
    pub const fn apply(self, val: u8, carry: bool) -> (u8, bool) {
        match self {
            ShiftOp::Rlc => (val.rotate_left(1), val & 0x80 != 0),
            ShiftOp::Rrc => (val.rotate_right(1), val & 0x01 != 0),
            ShiftOp::Rl => ((val << 1) | carry as u8, val & 0x80 != 0),
            ShiftOp::Rr => ((val >> 1) | ((carry as u8) << 7), val & 0x01 != 0),
            ShiftOp::Sla => (val << 1, val & 0x80 != 0),
            ShiftOp::Sra => ((val >> 1) | (val & 0x80), val & 0x01 != 0),
            ShiftOp::Swap => (val.rotate_left(4), false),
            ShiftOp::Srl => (val >> 1, val & 0x01 != 0),
        }
    }
}

/// `RLCA`, `RRCA`, `RLA`, and `RRA`. These only ever touch A and always clear Z.
pub(super) fn rotate_a(cpu: &mut Cpu, _: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let (val, carry) = ShiftOp::from_field(middle_field(op)).apply(cpu.a, cpu.f.c);
    cpu.a = val;
    cpu.f.set_for_byte_shift_op(false, carry);
    Ok(4)
}

/// Opcode: 0xCB
/// Fetches the next byte and runs it from the prefixed table. The returned cycles include the
/// prefix fetch.
pub(super) fn prefixed(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    let address = cpu.pc;
    let opcode = cpu.fetch_byte(mem);
    let pattern =
        decode_prefixed(opcode).ok_or(Fatal::UnknownPrefixedOpcode { opcode, address })?;
    (pattern.exec)(cpu, mem, opcode)
}

pub(super) fn shift(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = RegOrPointer::from_field(low_field(op))?;
    let (val, carry) =
        ShiftOp::from_field(middle_field(op)).apply(cpu.read_operand(mem, reg), cpu.f.c);
    cpu.write_operand(mem, reg, val)?;
    cpu.f.set_for_byte_shift_op(val == 0, carry);
    Ok(if reg.is_pointer() { 16 } else { 8 })
}

/// `BIT u3, r8`. Z is set when the bit is clear. Carry is untouched.
pub(super) fn bit(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = RegOrPointer::from_field(low_field(op))?;
    let val = cpu.read_operand(mem, reg);
    cpu.f.z = !check_bit(middle_field(op), val);
    cpu.f.n = false;
    cpu.f.h = true;
    Ok(if reg.is_pointer() { 12 } else { 8 })
}

pub(super) fn res(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = RegOrPointer::from_field(low_field(op))?;
    let val = cpu.read_operand(mem, reg) & !(1 << middle_field(op));
    cpu.write_operand(mem, reg, val)?;
    Ok(if reg.is_pointer() { 16 } else { 8 })
}

pub(super) fn set(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = RegOrPointer::from_field(low_field(op))?;
    let val = cpu.read_operand(mem, reg) | (1 << middle_field(op));
    cpu.write_operand(mem, reg, val)?;
    Ok(if reg.is_pointer() { 16 } else { 8 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_through_carry() {
        assert_eq!(ShiftOp::Rl.apply(0x80, false), (0x00, true));
        assert_eq!(ShiftOp::Rl.apply(0x01, true), (0x03, false));
        assert_eq!(ShiftOp::Rr.apply(0x01, true), (0x80, true));
        assert_eq!(ShiftOp::Rlc.apply(0x81, false), (0x03, true));
        assert_eq!(ShiftOp::Rrc.apply(0x01, false), (0x80, true));
    }

    #[test]
    fn shifts_keep_or_drop_the_sign() {
        assert_eq!(ShiftOp::Sra.apply(0x81, false), (0xC0, true));
        assert_eq!(ShiftOp::Srl.apply(0x81, true), (0x40, true));
        assert_eq!(ShiftOp::Sla.apply(0xC0, false), (0x80, true));
        assert_eq!(ShiftOp::Swap.apply(0xA5, true), (0x5A, false));
    }
}
