use serde::Deserialize;
use serde::Serialize;
use tracing::trace;

use crate::Fatal;

// TODO: RAM enable, RAM bank select, and the clock latch (0x0000-0x1FFF, 0x4000-0x7FFF) are
// rejected until save RAM is emulated.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct MBC3 {
    rom_bank: u8,
    ram_bank: u8,
    ram_enabled: bool,
}

impl Default for MBC3 {
    fn default() -> Self {
        Self::new()
    }
}

impl MBC3 {
    pub const fn new() -> Self {
        Self {
            rom_bank: 1,
            ram_bank: 0,
            ram_enabled: false,
        }
    }

    /// Never 0.
    pub const fn rom_bank(&self) -> u8 {
        self.rom_bank
    }

    pub const fn ram_bank(&self) -> u8 {
        self.ram_bank
    }

    pub const fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    pub fn write_byte(&mut self, index: u16, value: u8) -> Result<(), Fatal> {
        match index {
            0x2000..=0x3FFF => {
                self.rom_bank = match value & 0x7F {
                    0 => 1,
                    bank => bank,
                };
                trace!("MBC3 selected ROM bank {}", self.rom_bank);
                Ok(())
            }
            address => Err(Fatal::UnimplementedBankControl { address, value }),
        }
    }
}
