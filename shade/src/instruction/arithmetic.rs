use super::*;

/// The eight accumulator operations selected by bits 3 through 5 of the `10ooosss` and
/// `11ooo110` blocks.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
pub enum AluOp {
    #[display("ADD")]
    Add,
    #[display("ADC")]
    Adc,
    #[display("SUB")]
    Sub,
    #[display("SBC")]
    Sbc,
    #[display("AND")]
    And,
    #[display("XOR")]
    Xor,
    #[display("OR")]
    Or,
    #[display("CP")]
    Cp,
}

impl AluOp {
    pub const fn from_field(field: u8) -> Self {
        match field & 0x7 {
            0 => Self::Add,
            1 => Self::Adc,
            2 => Self::Sub,
            3 => Self::Sbc,
            4 => Self::And,
            5 => Self::Xor,
            6 => Self::Or,
            _ => Self::Cp,
        }
    }

    /// Applies this operation to the accumulator.
    pub fn apply(self, cpu: &mut Cpu, val: u8) {
        let a = cpu.a;
        let carry = cpu.f.c as u8;
        let f = &mut cpu.f;
        let result = match self {
            AluOp::Add => {
                let (res, c) = a.overflowing_add(val);
                f.n = false;
                f.h = (a & 0x0F) + (val & 0x0F) > 0x0F;
                f.c = c;
                res
            }
            AluOp::Adc => {
                let (res, c1) = a.overflowing_add(val);
                let (res, c2) = res.overflowing_add(carry);
                f.n = false;
                f.h = (a & 0x0F) + (val & 0x0F) + carry > 0x0F;
                f.c = c1 | c2;
                res
            }
            AluOp::Sub | AluOp::Cp => {
                let (res, c) = a.overflowing_sub(val);
                f.n = true;
                f.h = (a & 0x0F) < (val & 0x0F);
                f.c = c;
                res
            }
            AluOp::Sbc => {
                let (res, c1) = a.overflowing_sub(val);
                let (res, c2) = res.overflowing_sub(carry);
                f.n = true;
                f.h = (a & 0x0F) < (val & 0x0F) + carry;
                f.c = c1 | c2;
                res
            }
            AluOp::And => {
                f.n = false;
                f.h = true;
                f.c = false;
                a & val
            }
            AluOp::Xor => {
                f.n = false;
                f.h = false;
                f.c = false;
                a ^ val
            }
            AluOp::Or => {
                f.n = false;
                f.h = false;
                f.c = false;
                a | val
            }
        };
        f.z = result == 0;
        if !matches!(self, AluOp::Cp) {
            cpu.a = result;
        }
    }
}

pub(super) fn alu_register(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let src = RegOrPointer::from_field(low_field(op))?;
    let val = cpu.read_operand(mem, src);
    AluOp::from_field(middle_field(op)).apply(cpu, val);
    Ok(if src.is_pointer() { 8 } else { 4 })
}

pub(super) fn alu_immediate(
    cpu: &mut Cpu,
    mem: &mut dyn MemoryLike,
    op: u8,
) -> Result<u8, Fatal> {
    let val = cpu.fetch_byte(mem);
    AluOp::from_field(middle_field(op)).apply(cpu, val);
    Ok(8)
}

/// `INC r8`. Carry is untouched. The half carry is set whenever the low nibble rolls over to 0.
pub(super) fn inc(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = RegOrPointer::from_field(middle_field(op))?;
    let val = cpu.read_operand(mem, reg).wrapping_add(1);
    cpu.write_operand(mem, reg, val)?;
    cpu.f.z = val == 0;
    cpu.f.n = false;
    cpu.f.h = val & 0x0F == 0;
    Ok(if reg.is_pointer() { 12 } else { 4 })
}

/// `DEC r8`. Carry is untouched. The half carry (a borrow here) is set whenever the low nibble
/// rolls under to 0xF.
pub(super) fn dec(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = RegOrPointer::from_field(middle_field(op))?;
    let val = cpu.read_operand(mem, reg).wrapping_sub(1);
    cpu.write_operand(mem, reg, val)?;
    cpu.f.z = val == 0;
    cpu.f.n = true;
    cpu.f.h = val & 0x0F == 0x0F;
    Ok(if reg.is_pointer() { 12 } else { 4 })
}

pub(super) fn inc_wide(cpu: &mut Cpu, _: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = WideReg::from_field(pair_field(op))?;
    cpu.write_wide(reg, cpu.read_wide(reg).wrapping_add(1));
    Ok(8)
}

pub(super) fn dec_wide(cpu: &mut Cpu, _: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = WideReg::from_field(pair_field(op))?;
    cpu.write_wide(reg, cpu.read_wide(reg).wrapping_sub(1));
    Ok(8)
}

/// `ADD HL, r16`. Zero is untouched, the carries come from bits 11 and 15.
pub(super) fn add_hl(cpu: &mut Cpu, _: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let value = cpu.read_wide(WideReg::from_field(pair_field(op))?);
    let hl = cpu.hl.get();
    let (res, carry) = hl.overflowing_add(value);
    cpu.f.n = false;
    cpu.f.h = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
    cpu.f.c = carry;
    cpu.hl.set(res);
    Ok(8)
}

/// Computes SP plus a signed offset and sets the flags the way both `ADD SP, e8` and
/// `LD HL, SP+e8` do: the carries come from the unsigned low byte addition.
pub(super) fn offset_sp(cpu: &mut Cpu, offset: u8) -> u16 {
    let sp = cpu.sp;
    cpu.f.z = false;
    cpu.f.n = false;
    cpu.f.h = (sp & 0x0F) + (offset as u16 & 0x0F) > 0x0F;
    cpu.f.c = (sp & 0xFF) + offset as u16 > 0xFF;
    sp.wrapping_add_signed(offset as i8 as i16)
}

pub(super) fn add_sp(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    let offset = cpu.fetch_byte(mem);
    cpu.sp = offset_sp(cpu, offset);
    Ok(16)
}

pub(super) fn daa(cpu: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.a = decimal_adjust(cpu.a, &mut cpu.f)?;
    Ok(4)
}

/// ComPLement accumulator.
pub(super) fn cpl(cpu: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.a = !cpu.a;
    cpu.f.n = true;
    cpu.f.h = true;
    Ok(4)
}

/// Set Carry.
pub(super) fn scf(cpu: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.f.n = false;
    cpu.f.h = false;
    cpu.f.c = true;
    Ok(4)
}

/// CompLement carry flag.
pub(super) fn ccf(cpu: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.f.n = false;
    cpu.f.h = false;
    cpu.f.c = !cpu.f.c;
    Ok(4)
}
