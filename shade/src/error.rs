use thiserror::Error;

/// Every condition the core refuses to emulate. None of these are recoverable: the machine stops
/// executing, the dump is logged, and the driver is expected to end the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Fatal {
    #[error("boot image must be exactly 256 bytes, got {0}")]
    BootImageSize(usize),
    #[error("cartridge image is {0} bytes, too small to hold a header")]
    CartridgeTooSmall(usize),
    #[error("unknown cartridge banking type 0x{0:0>2X}")]
    UnknownCartridgeType(u8),
    #[error("cartridge banking type 0x{code:0>2X} ({kind}) is not supported")]
    UnsupportedCartridge { kind: &'static str, code: u8 },
    #[error("write of 0x{value:0>2X} to bank controller register at 0x{address:0>4X} is not implemented")]
    UnimplementedBankControl { address: u16, value: u8 },
    #[error("unknown opcode 0x{opcode:0>2X} at 0x{address:0>4X}")]
    UnknownOpcode { opcode: u8, address: u16 },
    #[error("unknown prefixed opcode 0xCB 0x{opcode:0>2X} at 0x{address:0>4X}")]
    UnknownPrefixedOpcode { opcode: u8, address: u16 },
    #[error("no decimal adjust correction for A=0x{a:0>2X} with F=0x{flags:0>2X}")]
    DecimalAdjust { a: u8, flags: u8 },
    #[error("illegal {kind} selector {value}")]
    InvalidSelector { kind: &'static str, value: u8 },
}
