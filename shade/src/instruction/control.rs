use super::*;

use tracing::debug;

use crate::cpu::CpuState;

pub(super) fn nop(_: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    Ok(4)
}

/// Op Code: 0x76
/// Nothing can raise an interrupt, so a halted CPU stays halted.
pub(super) fn halt(cpu: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    debug!("CPU halted at 0x{:0>4X}", cpu.pc.wrapping_sub(1));
    cpu.state = CpuState::Halted;
    Ok(4)
}

/// Op Code: 0x10
/// `STOP` is two bytes long. The second is skipped.
pub(super) fn stop(cpu: &mut Cpu, mem: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    debug!("CPU stopped at 0x{:0>4X}", cpu.pc.wrapping_sub(1));
    cpu.fetch_byte(mem);
    cpu.state = CpuState::Stopped;
    Ok(4)
}

pub(super) fn di(cpu: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.ime = false;
    Ok(4)
}

pub(super) fn ei(cpu: &mut Cpu, _: &mut dyn MemoryLike, _: u8) -> Result<u8, Fatal> {
    cpu.ime = true;
    Ok(4)
}
