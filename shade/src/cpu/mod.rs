use std::hash::Hash;

use tracing::trace;

use crate::instruction::decode;
use crate::instruction::disassemble_at;
use crate::instruction::Condition;
use crate::instruction::HalfRegister;
use crate::instruction::RegOrPointer;
use crate::instruction::StackReg;
use crate::instruction::WideReg;
use crate::mem::MemoryLike;
use crate::Fatal;


/// The number of clock units a stalled (halted or stopped) CPU burns per step.
pub const IDLE_CYCLES: u8 = 4;

#[derive(
    Debug, Default, Hash, Clone, PartialEq, Eq, derive_more::Display,
)]
#[display(
    "CPU {{ A=0x{:0>2X} F={} BC=0x{} DE=0x{} HL=0x{} SP=0x{:0>4X} PC=0x{:0>4X} IME={} State={} }}",
    a,
    f,
    bc,
    de,
    hl,
    sp,
    pc,
    ime,
    state
)]
pub struct Cpu {
    pub a: u8,
    pub f: Flags,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
    /// The SP register
    pub sp: u16,
    /// The PC register
    pub pc: u16,
    /// Written by `DI`, `EI`, and `RETI`. Nothing dispatches interrupts, so this is only ever
    /// observed.
    pub ime: bool,
    /// Once the CPU has halted or stopped, it keeps being stepped but never fetches again. There
    /// are no interrupts to wake it.
    pub state: CpuState,
}

#[derive(
    Debug,
    Default,
    Hash,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum CpuState {
    #[default]
    Running,
    Halted,
    Stopped,
}

/// Two 8-bit registers that share one 16-bit cell. The high half is the first-named register
/// (e.g. B in BC).
#[derive(
    Debug, Default, Hash, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::From,
)]
#[display("{:0>4X}", _0)]
pub struct RegisterPair(u16);

impl RegisterPair {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    pub const fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn lo(self) -> u8 {
        self.0 as u8
    }

    pub fn set_hi(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | ((value as u16) << 8);
    }

    pub fn set_lo(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | value as u16;
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Hash, derive_more::Display,
)]
#[display(
    "Flags(Z={} N={} H={} C={})",
    *z as u8,
    *n as u8,
    *h as u8,
    *c as u8
)]
pub struct Flags {
    /// The zero flag
    pub z: bool,
    /// The substraction flag
    pub n: bool,
    /// The half-carry flag
    pub h: bool,
    /// The full carry flag
    pub c: bool,
}

impl From<u8> for Flags {
    fn from(value: u8) -> Self {
        Self {
            z: check_bit_const::<7>(value),
            n: check_bit_const::<6>(value),
            h: check_bit_const::<5>(value),
            c: check_bit_const::<4>(value),
        }
    }
}

impl Flags {
    pub fn set_from_byte(&mut self, val: u8) {
        *self = val.into();
    }

    /// Used by the rotate and shift group, which all clear N and H.
    pub fn set_for_byte_shift_op(&mut self, z: bool, c: bool) {
        self.z = z;
        self.n = false;
        self.h = false;
        self.c = c;
    }

    /// The low nibble is always zero.
    pub fn as_byte(&self) -> u8 {
        bool_to_mask::<7>(self.z)
            | bool_to_mask::<6>(self.n)
            | bool_to_mask::<5>(self.h)
            | bool_to_mask::<4>(self.c)
    }
}

const fn bit_select<const B: u8>() -> u8 {
    const {
        match B {
            n @ 0..=7 => 0x1 << n,
            _ => panic!("You must select between the 0th and 7th bit!"),
        }
    }
}

const fn bool_to_mask<const B: u8>(val: bool) -> u8 {
    (val as u8) << B
}

pub(crate) const fn check_bit(bit: u8, src: u8) -> bool {
    let bit = 0x1 << bit;
    (src & bit) == bit
}

pub const fn check_bit_const<const B: u8>(src: u8) -> bool {
    (src & bit_select::<B>()) == bit_select::<B>()
}

impl Cpu {
    /// Constructs a new CPU with each register set to 0, which is the power-on state the boot
    /// image expects.
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }

    /// Returns the value of the Z flag
    pub fn zero_flag(&self) -> bool {
        self.f.z
    }

    /// Returns the value of the N flag
    pub fn subtraction_flag(&self) -> bool {
        self.f.n
    }

    /// Returns the value of the H flag
    pub fn half_carry_flag(&self) -> bool {
        self.f.h
    }

    /// Returns the value of the C flag
    pub fn carry_flag(&self) -> bool {
        self.f.c
    }

    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f.as_byte()])
    }

    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        self.f.set_from_byte(f);
    }

    pub fn read_half(&self, reg: HalfRegister) -> u8 {
        match reg {
            HalfRegister::A => self.a,
            HalfRegister::B => self.bc.hi(),
            HalfRegister::C => self.bc.lo(),
            HalfRegister::D => self.de.hi(),
            HalfRegister::E => self.de.lo(),
            HalfRegister::H => self.hl.hi(),
            HalfRegister::L => self.hl.lo(),
        }
    }

    pub fn write_half(&mut self, reg: HalfRegister, val: u8) {
        match reg {
            HalfRegister::A => self.a = val,
            HalfRegister::B => self.bc.set_hi(val),
            HalfRegister::C => self.bc.set_lo(val),
            HalfRegister::D => self.de.set_hi(val),
            HalfRegister::E => self.de.set_lo(val),
            HalfRegister::H => self.hl.set_hi(val),
            HalfRegister::L => self.hl.set_lo(val),
        }
    }

    pub fn read_wide(&self, reg: WideReg) -> u16 {
        match reg {
            WideReg::BC => self.bc.get(),
            WideReg::DE => self.de.get(),
            WideReg::HL => self.hl.get(),
            WideReg::SP => self.sp,
        }
    }

    pub fn write_wide(&mut self, reg: WideReg, val: u16) {
        match reg {
            WideReg::BC => self.bc.set(val),
            WideReg::DE => self.de.set(val),
            WideReg::HL => self.hl.set(val),
            WideReg::SP => self.sp = val,
        }
    }

    pub fn read_stack_reg(&self, reg: StackReg) -> u16 {
        match reg {
            StackReg::BC => self.bc.get(),
            StackReg::DE => self.de.get(),
            StackReg::HL => self.hl.get(),
            StackReg::AF => self.af(),
        }
    }

    pub fn write_stack_reg(&mut self, reg: StackReg, val: u16) {
        match reg {
            StackReg::BC => self.bc.set(val),
            StackReg::DE => self.de.set(val),
            StackReg::HL => self.hl.set(val),
            StackReg::AF => self.set_af(val),
        }
    }

    /// Reads either a half register or the byte that HL points to.
    pub fn read_operand(&self, mem: &dyn MemoryLike, reg: RegOrPointer) -> u8 {
        match reg {
            RegOrPointer::Reg(reg) => self.read_half(reg),
            RegOrPointer::Pointer => mem.read_byte(self.hl.get()),
        }
    }

    /// Stores the given byte into either an (half) register or into the memory map using the HL
    /// register as an index.
    pub fn write_operand(
        &mut self,
        mem: &mut dyn MemoryLike,
        reg: RegOrPointer,
        val: u8,
    ) -> Result<(), Fatal> {
        match reg {
            RegOrPointer::Reg(reg) => {
                self.write_half(reg, val);
                Ok(())
            }
            RegOrPointer::Pointer => mem.write_byte(self.hl.get(), val),
        }
    }

    pub(crate) fn fetch_byte(&mut self, mem: &dyn MemoryLike) -> u8 {
        let byte = mem.read_byte(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    /// Immediate words are stored little endian.
    pub(crate) fn fetch_word(&mut self, mem: &dyn MemoryLike) -> u16 {
        let lo = self.fetch_byte(mem);
        let hi = self.fetch_byte(mem);
        u16::from_le_bytes([lo, hi])
    }

    pub fn push(&mut self, mem: &mut dyn MemoryLike, val: u16) -> Result<(), Fatal> {
        let [hi, lo] = val.to_be_bytes();
        self.sp = self.sp.wrapping_sub(1);
        mem.write_byte(self.sp, hi)?;
        self.sp = self.sp.wrapping_sub(1);
        mem.write_byte(self.sp, lo)
    }

    pub fn pop(&mut self, mem: &dyn MemoryLike) -> u16 {
        let lo = mem.read_byte(self.sp);
        self.sp = self.sp.wrapping_add(1);
        let hi = mem.read_byte(self.sp);
        self.sp = self.sp.wrapping_add(1);
        u16::from_be_bytes([hi, lo])
    }

    pub fn matches(&self, cond: Condition) -> bool {
        match cond {
            Condition::Zero => self.f.z,
            Condition::NotZero => !self.f.z,
            Condition::Carry => self.f.c,
            Condition::NotCarry => !self.f.c,
        }
    }

    /// Fetches, decodes, and executes exactly one instruction, returning the number of clock
    /// units it took. A halted or stopped CPU does not fetch and idles for 4 units.
    ///
    /// When `trace` is set, each executed instruction is reported as a `trace` event. Nothing
    /// else about execution depends on it.
    pub fn step(&mut self, mem: &mut dyn MemoryLike, trace: bool) -> Result<u8, Fatal> {
        if !self.state.is_running() {
            return Ok(IDLE_CYCLES);
        }
        let address = self.pc;
        let opcode = self.fetch_byte(mem);
        let pattern = decode(opcode).ok_or(Fatal::UnknownOpcode { opcode, address })?;
        if trace {
            let text = disassemble_at(mem, address);
            trace!(
                "0x{address:0>4X}: {opcode:0>2X}  {}",
                text.as_deref().unwrap_or(pattern.mnemonic)
            );
        }
        (pattern.exec)(self, mem, opcode)
    }
}
