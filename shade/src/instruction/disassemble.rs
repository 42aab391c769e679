use super::*;

/// The pointer named by the `LD (r16), A` and `LD A, (r16)` family.
fn indirect_name(op: u8) -> &'static str {
    match pair_field(op) {
        0 => "(BC)",
        1 => "(DE)",
        2 => "(HL+)",
        _ => "(HL-)",
    }
}

/// Renders one instruction with its operands filled in. `operands` are the two bytes that follow
/// the opcode; instructions that are shorter ignore the rest. For `0xCB`, the first operand is the
/// prefixed opcode. Returns `None` for opcodes that do not exist.
pub fn disassemble(opcode: u8, operands: [u8; 2]) -> Option<String> {
    let [b1, _] = operands;
    let d8 = b1;
    let a16 = u16::from_le_bytes(operands);
    let e8 = b1 as i8;
    let r8 = |field| RegOrPointer::from_field(field).ok();
    let text = match opcode {
        0x00 => "NOP".to_owned(),
        0x08 => format!("LD (0x{a16:0>4X}), SP"),
        0x10 => "STOP".to_owned(),
        0x18 => format!("JR {e8}"),
        0x27 => "DAA".to_owned(),
        0x2F => "CPL".to_owned(),
        0x37 => "SCF".to_owned(),
        0x3F => "CCF".to_owned(),
        0x76 => "HALT".to_owned(),
        0xC3 => format!("JP 0x{a16:0>4X}"),
        0xC9 => "RET".to_owned(),
        0xCB => return disassemble_prefixed(b1),
        0xCD => format!("CALL 0x{a16:0>4X}"),
        0xD9 => "RETI".to_owned(),
        0xE0 => format!("LDH (0x{d8:0>2X}), A"),
        0xE2 => "LD (C), A".to_owned(),
        0xE8 => format!("ADD SP, {e8}"),
        0xE9 => "JP HL".to_owned(),
        0xEA => format!("LD (0x{a16:0>4X}), A"),
        0xF0 => format!("LDH A, (0x{d8:0>2X})"),
        0xF2 => "LD A, (C)".to_owned(),
        0xF3 => "DI".to_owned(),
        0xF8 => format!("LD HL, SP{e8:+}"),
        0xF9 => "LD SP, HL".to_owned(),
        0xFA => format!("LD A, (0x{a16:0>4X})"),
        0xFB => "EI".to_owned(),
        op if op & 0xE7 == 0x07 => {
            let name = match middle_field(op) {
                0 => "RLCA",
                1 => "RRCA",
                2 => "RLA",
                _ => "RRA",
            };
            name.to_owned()
        }
        op if op & 0xE7 == 0x20 => {
            let cond = Condition::from_field(condition_field(op)).ok()?;
            format!("JR {cond}, {e8}")
        }
        op if op & 0xCF == 0x01 => {
            let reg = WideReg::from_field(pair_field(op)).ok()?;
            format!("LD {reg}, 0x{a16:0>4X}")
        }
        op if op & 0xCF == 0x02 => format!("LD {}, A", indirect_name(op)),
        op if op & 0xCF == 0x03 => format!("INC {}", WideReg::from_field(pair_field(op)).ok()?),
        op if op & 0xCF == 0x09 => {
            format!("ADD HL, {}", WideReg::from_field(pair_field(op)).ok()?)
        }
        op if op & 0xCF == 0x0A => format!("LD A, {}", indirect_name(op)),
        op if op & 0xCF == 0x0B => format!("DEC {}", WideReg::from_field(pair_field(op)).ok()?),
        op if op & 0xC7 == 0x04 => format!("INC {}", r8(middle_field(op))?),
        op if op & 0xC7 == 0x05 => format!("DEC {}", r8(middle_field(op))?),
        op if op & 0xC7 == 0x06 => format!("LD {}, 0x{d8:0>2X}", r8(middle_field(op))?),
        op if op & 0xC0 == 0x40 => {
            format!("LD {}, {}", r8(middle_field(op))?, r8(low_field(op))?)
        }
        op if op & 0xC0 == 0x80 => {
            let alu = AluOp::from_field(middle_field(op));
            format!("{alu} A, {}", r8(low_field(op))?)
        }
        op if op & 0xE7 == 0xC0 => {
            format!("RET {}", Condition::from_field(condition_field(op)).ok()?)
        }
        op if op & 0xE7 == 0xC2 => {
            let cond = Condition::from_field(condition_field(op)).ok()?;
            format!("JP {cond}, 0x{a16:0>4X}")
        }
        op if op & 0xE7 == 0xC4 => {
            let cond = Condition::from_field(condition_field(op)).ok()?;
            format!("CALL {cond}, 0x{a16:0>4X}")
        }
        op if op & 0xCF == 0xC1 => format!("POP {}", StackReg::from_field(pair_field(op)).ok()?),
        op if op & 0xCF == 0xC5 => format!("PUSH {}", StackReg::from_field(pair_field(op)).ok()?),
        op if op & 0xC7 == 0xC6 => {
            format!("{} A, 0x{d8:0>2X}", AluOp::from_field(middle_field(op)))
        }
        op if op & 0xC7 == 0xC7 => format!("RST 0x{:0>2X}", op & 0x38),
        _ => return None,
    };
    Some(text)
}

fn disassemble_prefixed(op: u8) -> Option<String> {
    let target = RegOrPointer::from_field(low_field(op)).ok()?;
    let bit = middle_field(op);
    Some(match op & 0xC0 {
        0x00 => format!("{} {target}", ShiftOp::from_field(bit)),
        0x40 => format!("BIT {bit}, {target}"),
        0x80 => format!("RES {bit}, {target}"),
        _ => format!("SET {bit}, {target}"),
    })
}

/// Reads the instruction at `address` and renders it.
pub fn disassemble_at(mem: &dyn MemoryLike, address: u16) -> Option<String> {
    disassemble(
        mem.read_byte(address),
        [
            mem.read_byte(address.wrapping_add(1)),
            mem.read_byte(address.wrapping_add(2)),
        ],
    )
}
