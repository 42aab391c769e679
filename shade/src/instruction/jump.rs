use super::*;

/// Adds a signed displacement to PC. The displacement is relative to the byte after the operand.
fn relative(cpu: &mut Cpu, offset: u8) {
    cpu.pc = cpu.pc.wrapping_add_signed(offset as i8 as i16);
}

/// Op Code: 0x18
pub(super) fn jr(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    let offset = cpu.fetch_byte(mem);
    relative(cpu, offset);
    Ok(12)
}

/// Op Codes: 0x20, 0x30, 0x28, 0x38
pub(super) fn jr_cc(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let cond = Condition::from_field(condition_field(op))?;
    let offset = cpu.fetch_byte(mem);
    if cpu.matches(cond) {
        relative(cpu, offset);
        Ok(12)
    } else {
        Ok(8)
    }
}

/// Op Code: 0xC3
pub(super) fn jp(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.pc = cpu.fetch_word(mem);
    Ok(16)
}

/// Op Codes: 0xC2, 0xD2, 0xCA, 0xDA
pub(super) fn jp_cc(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let cond = Condition::from_field(condition_field(op))?;
    let addr = cpu.fetch_word(mem);
    if cpu.matches(cond) {
        cpu.pc = addr;
        Ok(16)
    } else {
        Ok(12)
    }
}

/// Op Code: 0xE9
pub(super) fn jp_hl(cpu: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.pc = cpu.hl.get();
    Ok(4)
}

/// Op Code: 0xCD
pub(super) fn call(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    let addr = cpu.fetch_word(mem);
    cpu.push(mem, cpu.pc)?;
    cpu.pc = addr;
    Ok(24)
}

/// Op Codes: 0xC4, 0xD4, 0xCC, 0xDC
pub(super) fn call_cc(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let cond = Condition::from_field(condition_field(op))?;
    let addr = cpu.fetch_word(mem);
    if cpu.matches(cond) {
        cpu.push(mem, cpu.pc)?;
        cpu.pc = addr;
        Ok(24)
    } else {
        Ok(12)
    }
}

/// Op Code: 0xC9
pub(super) fn ret(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.pc = cpu.pop(mem);
    Ok(16)
}

/// Op Codes: 0xC0, 0xD0, 0xC8, 0xD8
pub(super) fn ret_cc(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    let cond = Condition::from_field(condition_field(op))?;
    if cpu.matches(cond) {
        cpu.pc = cpu.pop(mem);
        Ok(20)
    } else {
        Ok(8)
    }
}

/// Op Code: 0xD9
/// Return from the subroutine and enable interrupts
pub(super) fn reti(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.pc = cpu.pop(mem);
    cpu.ime = true;
    Ok(16)
}

/// Op Codes: 0xC7, 0xCF, 0xD7, 0xDF, 0xE7, 0xEF, 0xF7, 0xFF
/// Calls the fixed vector `op & 0x38`.
pub(super) fn rst(cpu: &mut Cpu, mem: &mut dyn MemoryLike, op: u8) -> Result<u8, Fatal> {
    cpu.push(mem, cpu.pc)?;
    cpu.pc = (op & 0x38) as u16;
    Ok(16)
}
