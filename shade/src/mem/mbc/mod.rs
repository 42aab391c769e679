mod mbc3;

pub use mbc3::*;
use serde::Deserialize;
use serde::Serialize;

use crate::Fatal;

/// The size of a ROM banks, 16 KiB.
pub const ROM_BANK_SIZE: usize = 16 * 1024;

/// The start of the switchable ROM window.
const SWITCHABLE_START: u16 = 0x4000;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryBankController {
    /// There is no external MBC. The game ROM is mapped into the 32 KiB that starts at 0x0000 and
    /// extends to 0x7FFF, and writes into that range have nothing to talk to.
    ///
    /// See [Pan Docs](https://gbdev.io/pandocs/nombc.html).
    Direct,
    /// Only ROM bank selection is implemented. Every other control register is rejected.
    ///
    /// See [Pan Docs](https://gbdev.io/pandocs/MBC3.html).
    MBC3(MBC3),
}

impl MemoryBankController {
    /// Picks the controller from the cartridge type byte at 0x147.
    pub fn new(cartridge_type: u8) -> Result<Self, Fatal> {
        let unsupported = |kind| Fatal::UnsupportedCartridge {
            kind,
            code: cartridge_type,
        };
        match cartridge_type {
            0x00 => Ok(Self::Direct),
            0x01..=0x03 => Err(unsupported("MBC1")),
            0x05..=0x06 => Err(unsupported("MBC2")),
            0x0F..=0x13 => Ok(Self::MBC3(MBC3::new())),
            0x19..=0x1E => Err(unsupported("MBC5")),
            code => Err(Fatal::UnknownCartridgeType(code)),
        }
    }

    /// The offset into the cartridge image that a read of `index` (below 0x8000) lands on.
    pub(crate) fn rom_offset(&self, index: u16) -> usize {
        match self {
            _ if index < SWITCHABLE_START => index as usize,
            MemoryBankController::Direct => index as usize,
            MemoryBankController::MBC3(controller) => {
                controller.rom_bank() as usize * ROM_BANK_SIZE
                    + (index - SWITCHABLE_START) as usize
            }
        }
    }

    /// Routes a write into the ROM range to the controller. Returns `false` when there is no
    /// controller to receive it, in which case the caller keeps the byte.
    pub(crate) fn write_byte(&mut self, index: u16, value: u8) -> Result<bool, Fatal> {
        match self {
            MemoryBankController::Direct => Ok(false),
            MemoryBankController::MBC3(controller) => {
                controller.write_byte(index, value)?;
                Ok(true)
            }
        }
    }

    /// The bank visible at 0x4000-0x7FFF. Always 1 without a controller.
    pub fn rom_bank(&self) -> u8 {
        match self {
            MemoryBankController::Direct => 1,
            MemoryBankController::MBC3(controller) => controller.rom_bank(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MemoryBankController::Direct => "no MBC",
            MemoryBankController::MBC3(_) => "MBC3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartridge_types() {
        assert_eq!(MemoryBankController::new(0x00), Ok(MemoryBankController::Direct));
        assert!(matches!(
            MemoryBankController::new(0x13),
            Ok(MemoryBankController::MBC3(_))
        ));
        assert_eq!(
            MemoryBankController::new(0x02),
            Err(Fatal::UnsupportedCartridge {
                kind: "MBC1",
                code: 0x02
            })
        );
        assert_eq!(
            MemoryBankController::new(0x06),
            Err(Fatal::UnsupportedCartridge {
                kind: "MBC2",
                code: 0x06
            })
        );
        assert_eq!(
            MemoryBankController::new(0x1B),
            Err(Fatal::UnsupportedCartridge {
                kind: "MBC5",
                code: 0x1B
            })
        );
        assert_eq!(
            MemoryBankController::new(0x04),
            Err(Fatal::UnknownCartridgeType(0x04))
        );
        assert_eq!(
            MemoryBankController::new(0xFF),
            Err(Fatal::UnknownCartridgeType(0xFF))
        );
    }

    #[test]
    fn switchable_window_follows_the_bank() {
        let mut mbc = MemoryBankController::new(0x11).unwrap();
        assert_eq!(mbc.rom_offset(0x0123), 0x0123);
        assert_eq!(mbc.rom_offset(0x4000), 0x4000);
        assert!(mbc.write_byte(0x2000, 0x05).unwrap());
        assert_eq!(mbc.rom_offset(0x4001), 5 * ROM_BANK_SIZE + 1);
        assert_eq!(mbc.rom_offset(0x3FFF), 0x3FFF);
    }

    #[test]
    fn direct_keeps_writes_for_the_bus() {
        let mut mbc = MemoryBankController::Direct;
        assert!(!mbc.write_byte(0x2000, 0x05).unwrap());
        assert_eq!(mbc.rom_offset(0x7FFF), 0x7FFF);
    }
}
