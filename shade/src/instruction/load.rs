use super::*;

/// `LD r8, r8`, opcodes 0x40 through 0x7F (sans 0x76).
pub(super) fn load_register(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let dest = RegOrPointer::from_field(middle_field(op))?;
    let src = RegOrPointer::from_field(low_field(op))?;
    let val = cpu.read_operand(mem, src);
    cpu.write_operand(mem, dest, val)?;
    Ok(if dest.is_pointer() || src.is_pointer() { 8 } else { 4 })
}

/// `LD r8, d8`, opcodes 0x_6 and 0x_E.
pub(super) fn load_immediate(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let dest = RegOrPointer::from_field(middle_field(op))?;
    let val = cpu.fetch_byte(mem);
    cpu.write_operand(mem, dest, val)?;
    Ok(if dest.is_pointer() { 12 } else { 8 })
}

/// `LD r16, d16`, opcodes 0x_1.
pub(super) fn load_wide_immediate(
    cpu: &mut Cpu,
    mem: &mut dyn MemoryLike,
    op: u8,
) -> Result<u8, Fatal> {
    let reg = WideReg::from_field(pair_field(op))?;
    let val = cpu.fetch_word(mem);
    cpu.write_wide(reg, val);
    Ok(12)
}

/// The pointer used by the `LD (r16), A` and `LD A, (r16)` family. The HL forms post-increment or
/// post-decrement HL.
fn indirect_address(cpu: &mut Cpu, op: u8) -> u16 {
    match pair_field(op) {
        0 => cpu.bc.get(),
        1 => cpu.de.get(),
        2 => {
            let addr = cpu.hl.get();
            cpu.hl.set(addr.wrapping_add(1));
            addr
        }
        _ => {
            let addr = cpu.hl.get();
            cpu.hl.set(addr.wrapping_sub(1));
            addr
        }
    }
}

/// `LD (BC), A`, `LD (DE), A`, `LD (HL+), A`, `LD (HL-), A`
pub(super) fn store_a_indirect(
    cpu: &mut Cpu,
    mem: &mut dyn MemoryLike,
    op: u8,
) -> Result<u8, Fatal> {
    let addr = indirect_address(cpu, op);
    mem.write_byte(addr, cpu.a)?;
    Ok(8)
}

/// `LD A, (BC)`, `LD A, (DE)`, `LD A, (HL+)`, `LD A, (HL-)`
pub(super) fn load_a_indirect(
    cpu: &mut Cpu,
    mem: &mut dyn MemoryLike,
    op: u8,
) -> Result<u8, Fatal> {
    let addr = indirect_address(cpu, op);
    cpu.a = mem.read_byte(addr);
    Ok(8)
}

/// Opcode: 0x08
/// Store SP & $FF at address n16 and SP >> 8 at address n16 + 1.
pub(super) fn store_sp(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    let addr = cpu.fetch_word(mem);
    let [lo, hi] = cpu.sp.to_le_bytes();
    mem.write_byte(addr, lo)?;
    mem.write_byte(addr.wrapping_add(1), hi)?;
    Ok(20)
}

pub(super) fn store_high(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    let offset = cpu.fetch_byte(mem);
    mem.write_byte(0xFF00 | offset as u16, cpu.a)?;
    Ok(12)
}

pub(super) fn load_high(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    let offset = cpu.fetch_byte(mem);
    cpu.a = mem.read_byte(0xFF00 | offset as u16);
    Ok(12)
}

pub(super) fn store_high_c(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    mem.write_byte(0xFF00 | cpu.bc.lo() as u16, cpu.a)?;
    Ok(8)
}

pub(super) fn load_high_c(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.a = mem.read_byte(0xFF00 | cpu.bc.lo() as u16);
    Ok(8)
}

pub(super) fn store_a_absolute(
    cpu: &mut Cpu,
    mem: &mut dyn MemoryLike,
    _: u8,
) -> Result<u8, Fatal> {
    let addr = cpu.fetch_word(mem);
    mem.write_byte(addr, cpu.a)?;
    Ok(16)
}

pub(super) fn load_a_absolute(
    cpu: &mut Cpu,
    mem: &mut dyn MemoryLike,
    _: u8,
) -> Result<u8, Fatal> {
    let addr = cpu.fetch_word(mem);
    cpu.a = mem.read_byte(addr);
    Ok(16)
}

/// Opcode: 0xF8
/// Add the signed value e8 to SP and store the result in HL.
pub(super) fn load_hl_sp_offset(
    cpu: &mut Cpu,
    mem: &mut dyn MemoryLike,
    _: u8,
) -> Result<u8, Fatal> {
    let offset = cpu.fetch_byte(mem);
    let val = arithmetic::offset_sp(cpu, offset);
    cpu.hl.set(val);
    Ok(12)
}

pub(super) fn load_sp_hl(cpu: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.sp = cpu.hl.get();
    Ok(8)
}

pub(super) fn push(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = StackReg::from_field(pair_field(op))?;
    let val = cpu.read_stack_reg(reg);
    cpu.push(mem, val)?;
    Ok(16)
}

pub(super) fn pop(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let reg = StackReg::from_field(pair_field(op))?;
    let val = cpu.pop(mem);
    cpu.write_stack_reg(reg, val);
    Ok(12)
}
