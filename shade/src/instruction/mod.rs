use crate::cpu::Cpu;
use crate::mem::MemoryLike;
use crate::Fatal;

mod arithmetic;
mod bcd;
mod bit_shift;
mod control;
mod disassemble;
mod jump;
mod load;

pub use arithmetic::AluOp;
pub use bcd::decimal_adjust;
pub use bit_shift::ShiftOp;
pub use disassemble::{disassemble, disassemble_at};

/// Executes one decoded instruction. The opcode byte is passed back in so that the handler can
/// pull its operand fields out of it. Returns the number of clock units consumed.
pub type Exec = fn(&mut Cpu, &mut dyn MemoryLike, u8) -> Result<u8, Fatal>;

/// One row in a dispatch table. An opcode belongs to this row when `opcode & mask == bits`.
#[derive(Clone, Copy)]
pub struct OpPattern {
    pub mask: u8,
    pub bits: u8,
    pub mnemonic: &'static str,
    pub exec: Exec,
}

impl OpPattern {
    const fn new(mask: u8, bits: u8, mnemonic: &'static str, exec: Exec) -> Self {
        Self {
            mask,
            bits,
            mnemonic,
            exec,
        }
    }

    pub const fn matches(&self, opcode: u8) -> bool {
        opcode & self.mask == self.bits
    }
}

impl std::fmt::Debug for OpPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OpPattern {{ mask: 0b{:0>8b}, bits: 0b{:0>8b}, mnemonic: {:?} }}",
            self.mask, self.bits, self.mnemonic
        )
    }
}

/// The unprefixed instruction set, searched top to bottom. Single opcodes come first, so that
/// e.g. `HALT` (0x76) wins over the `LD r8, r8` block it sits in.
pub static OP_PATTERNS: &[OpPattern] = &[
    OpPattern::new(0xFF, 0x00, "NOP", control::nop),
    OpPattern::new(0xFF, 0x08, "LD (a16), SP", load::store_sp),
    OpPattern::new(0xFF, 0x10, "STOP", control::stop),
    OpPattern::new(0xFF, 0x18, "JR e8", jump::jr),
    OpPattern::new(0xFF, 0x27, "DAA", arithmetic::daa),
    OpPattern::new(0xFF, 0x2F, "CPL", arithmetic::cpl),
    OpPattern::new(0xFF, 0x37, "SCF", arithmetic::scf),
    OpPattern::new(0xFF, 0x3F, "CCF", arithmetic::ccf),
    OpPattern::new(0xFF, 0x76, "HALT", control::halt),
    OpPattern::new(0xFF, 0xC3, "JP a16", jump::jp),
    OpPattern::new(0xFF, 0xC9, "RET", jump::ret),
    OpPattern::new(0xFF, 0xCB, "PREFIX", bit_shift::prefixed),
    OpPattern::new(0xFF, 0xCD, "CALL a16", jump::call),
    OpPattern::new(0xFF, 0xD9, "RETI", jump::reti),
    OpPattern::new(0xFF, 0xE0, "LDH (a8), A", load::store_high),
    OpPattern::new(0xFF, 0xE2, "LD (C), A", load::store_high_c),
    OpPattern::new(0xFF, 0xE8, "ADD SP, e8", arithmetic::add_sp),
    OpPattern::new(0xFF, 0xE9, "JP HL", jump::jp_hl),
    OpPattern::new(0xFF, 0xEA, "LD (a16), A", load::store_a_absolute),
    OpPattern::new(0xFF, 0xF0, "LDH A, (a8)", load::load_high),
    OpPattern::new(0xFF, 0xF2, "LD A, (C)", load::load_high_c),
    OpPattern::new(0xFF, 0xF3, "DI", control::di),
    OpPattern::new(0xFF, 0xF8, "LD HL, SP+e8", load::load_hl_sp_offset),
    OpPattern::new(0xFF, 0xF9, "LD SP, HL", load::load_sp_hl),
    OpPattern::new(0xFF, 0xFA, "LD A, (a16)", load::load_a_absolute),
    OpPattern::new(0xFF, 0xFB, "EI", control::ei),
    OpPattern::new(0xE7, 0x07, "RLCA/RRCA/RLA/RRA", bit_shift::rotate_a),
    OpPattern::new(0xE7, 0x20, "JR cc, e8", jump::jr_cc),
    OpPattern::new(0xCF, 0x01, "LD r16, d16", load::load_wide_immediate),
    OpPattern::new(0xCF, 0x02, "LD (r16), A", load::store_a_indirect),
    OpPattern::new(0xCF, 0x03, "INC r16", arithmetic::inc_wide),
    OpPattern::new(0xCF, 0x09, "ADD HL, r16", arithmetic::add_hl),
    OpPattern::new(0xCF, 0x0A, "LD A, (r16)", load::load_a_indirect),
    OpPattern::new(0xCF, 0x0B, "DEC r16", arithmetic::dec_wide),
    OpPattern::new(0xC7, 0x04, "INC r8", arithmetic::inc),
    OpPattern::new(0xC7, 0x05, "DEC r8", arithmetic::dec),
    OpPattern::new(0xC7, 0x06, "LD r8, d8", load::load_immediate),
    OpPattern::new(0xC0, 0x40, "LD r8, r8", load::load_register),
    OpPattern::new(0xC0, 0x80, "ALU A, r8", arithmetic::alu_register),
    OpPattern::new(0xE7, 0xC0, "RET cc", jump::ret_cc),
    OpPattern::new(0xE7, 0xC2, "JP cc, a16", jump::jp_cc),
    OpPattern::new(0xE7, 0xC4, "CALL cc, a16", jump::call_cc),
    OpPattern::new(0xCF, 0xC1, "POP r16", load::pop),
    OpPattern::new(0xCF, 0xC5, "PUSH r16", load::push),
    OpPattern::new(0xC7, 0xC6, "ALU A, d8", arithmetic::alu_immediate),
    OpPattern::new(0xC7, 0xC7, "RST", jump::rst),
];

/// The instructions behind the 0xCB prefix.
pub static PREFIXED_OP_PATTERNS: &[OpPattern] = &[
    OpPattern::new(0xF8, 0x00, "RLC r8", bit_shift::shift),
    OpPattern::new(0xF8, 0x08, "RRC r8", bit_shift::shift),
    OpPattern::new(0xF8, 0x10, "RL r8", bit_shift::shift),
    OpPattern::new(0xF8, 0x18, "RR r8", bit_shift::shift),
    OpPattern::new(0xF8, 0x20, "SLA r8", bit_shift::shift),
    OpPattern::new(0xF8, 0x28, "SRA r8", bit_shift::shift),
    OpPattern::new(0xF8, 0x30, "SWAP r8", bit_shift::shift),
    OpPattern::new(0xF8, 0x38, "SRL r8", bit_shift::shift),
    OpPattern::new(0xC0, 0x40, "BIT u3, r8", bit_shift::bit),
    OpPattern::new(0xC0, 0x80, "RES u3, r8", bit_shift::res),
    OpPattern::new(0xC0, 0xC0, "SET u3, r8", bit_shift::set),
];

/// Finds the first unprefixed pattern the opcode belongs to.
pub fn decode(opcode: u8) -> Option<&'static OpPattern> {
    OP_PATTERNS.iter().find(|p| p.matches(opcode))
}

/// Finds the first prefixed pattern the byte after 0xCB belongs to.
pub fn decode_prefixed(opcode: u8) -> Option<&'static OpPattern> {
    PREFIXED_OP_PATTERNS.iter().find(|p| p.matches(opcode))
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
pub enum HalfRegister {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

/// The 8-bit operand encoded in three bits of an opcode. Index 6 is not a register but the byte
/// HL points at.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
pub enum RegOrPointer {
    #[display("{_0}")]
    Reg(HalfRegister),
    #[display("(HL)")]
    Pointer,
}

impl RegOrPointer {
    pub fn from_field(field: u8) -> Result<Self, Fatal> {
        let reg = match field {
            0 => HalfRegister::B,
            1 => HalfRegister::C,
            2 => HalfRegister::D,
            3 => HalfRegister::E,
            4 => HalfRegister::H,
            5 => HalfRegister::L,
            6 => return Ok(Self::Pointer),
            7 => HalfRegister::A,
            value => {
                return Err(Fatal::InvalidSelector {
                    kind: "8-bit register",
                    value,
                })
            }
        };
        Ok(Self::Reg(reg))
    }

    /// Operations through (HL) touch memory and cost more.
    pub const fn is_pointer(self) -> bool {
        matches!(self, Self::Pointer)
    }
}

/// The register pair encoded in bits 4 and 5 of loads and 16-bit arithmetic.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
pub enum WideReg {
    BC,
    DE,
    HL,
    SP,
}

impl WideReg {
    pub fn from_field(field: u8) -> Result<Self, Fatal> {
        match field {
            0 => Ok(Self::BC),
            1 => Ok(Self::DE),
            2 => Ok(Self::HL),
            3 => Ok(Self::SP),
            value => Err(Fatal::InvalidSelector {
                kind: "16-bit register",
                value,
            }),
        }
    }
}

/// The register pair encoded in `PUSH` and `POP`, where AF takes the place of SP.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
pub enum StackReg {
    BC,
    DE,
    HL,
    AF,
}

impl StackReg {
    pub fn from_field(field: u8) -> Result<Self, Fatal> {
        match field {
            0 => Ok(Self::BC),
            1 => Ok(Self::DE),
            2 => Ok(Self::HL),
            3 => Ok(Self::AF),
            value => Err(Fatal::InvalidSelector {
                kind: "stack register",
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
pub enum Condition {
    #[display("NZ")]
    NotZero,
    #[display("Z")]
    Zero,
    #[display("NC")]
    NotCarry,
    #[display("C")]
    Carry,
}

impl Condition {
    pub fn from_field(field: u8) -> Result<Self, Fatal> {
        match field {
            0 => Ok(Self::NotZero),
            1 => Ok(Self::Zero),
            2 => Ok(Self::NotCarry),
            3 => Ok(Self::Carry),
            value => Err(Fatal::InvalidSelector {
                kind: "condition",
                value,
            }),
        }
    }
}

/// Bits 3 through 5 of an opcode. Used as the destination register, ALU operation, or bit index.
pub(crate) const fn middle_field(opcode: u8) -> u8 {
    (opcode >> 3) & 0x7
}

/// Bits 0 through 2 of an opcode, the source operand.
pub(crate) const fn low_field(opcode: u8) -> u8 {
    opcode & 0x7
}

/// Bits 4 and 5 of an opcode, the register pair.
pub(crate) const fn pair_field(opcode: u8) -> u8 {
    (opcode >> 4) & 0x3
}

/// Bits 3 and 4 of an opcode, the branch condition.
pub(crate) const fn condition_field(opcode: u8) -> u8 {
    (opcode >> 3) & 0x3
}
