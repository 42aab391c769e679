use std::fmt::Debug;

pub mod io;
mod mbc;

pub use mbc::MemoryBankController;
pub use mbc::MBC3;
pub use mbc::ROM_BANK_SIZE;

use io::IoRegisters;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::rom::CartridgeHeader;
use crate::Fatal;

/// The boot image is mapped over the first 256 bytes of the address space until it is disabled.
pub const BOOT_IMAGE_SIZE: usize = 0x100;

/// ADDR FF50. Writing a non-zero value unmaps the boot image for the rest of the session.
pub const BOOT_DISABLE: u16 = 0xFF50;

/// This trait is used to abstract over the memory map. This is used during testing.
pub trait MemoryLike {
    fn read_byte(&self, addr: u16) -> u8;

    fn write_byte(&mut self, addr: u16, val: u8) -> Result<(), Fatal>;
}

/// Overwrites the bits of `dest` that are set in `mask` and keeps the rest.
pub(crate) fn selective_write(dest: &mut u8, src: u8, mask: u8) {
    *dest = (*dest & !mask) | (src & mask);
}

#[derive(Clone, Hash, PartialEq, Eq)]
pub struct MemoryMap {
    /// Backs every address that nothing else claims, including VRAM, WRAM, HRAM, and unmapped IO.
    ram: Box<[u8]>,
    boot: [u8; BOOT_IMAGE_SIZE],
    overlay: bool,
    cart: Vec<u8>,
    mbc: MemoryBankController,
    io: IoRegisters,
}

impl Debug for MemoryMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMap")
            .field("overlay", &self.overlay)
            .field("cart_len", &self.cart.len())
            .field("mbc", &self.mbc)
            .field("io", &self.io)
            .finish_non_exhaustive()
    }
}

impl MemoryLike for MemoryMap {
    fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x00FF if self.overlay => self.boot[addr as usize],
            0x0000..=0x7FFF => self.read_cart(addr),
            0xFF00..=0xFF7F => self
                .io
                .read_byte(addr)
                .unwrap_or(self.ram[addr as usize]),
            _ => self.ram[addr as usize],
        }
    }

    /// Unlike reads, writes into the first 256 bytes are not affected by the boot overlay.
    fn write_byte(&mut self, addr: u16, val: u8) -> Result<(), Fatal> {
        match addr {
            0x0000..=0x7FFF => {
                if !self.mbc.write_byte(addr, val)? {
                    self.ram[addr as usize] = val;
                }
            }
            BOOT_DISABLE => {
                if val != 0 && self.overlay {
                    info!("Boot image unmapped");
                    self.overlay = false;
                }
                self.ram[addr as usize] = val;
            }
            0xFF00..=0xFF7F => {
                if !self.io.write_byte(addr, val) {
                    self.ram[addr as usize] = val;
                }
            }
            _ => self.ram[addr as usize] = val,
        }
        Ok(())
    }
}

impl MemoryMap {
    /// Builds the power-on memory map. The boot image must be exactly 256 bytes and the cartridge
    /// must at least contain a full header.
    pub fn new(boot: &[u8], cart: Vec<u8>) -> Result<Self, Fatal> {
        let boot: [u8; BOOT_IMAGE_SIZE] = boot
            .try_into()
            .map_err(|_| Fatal::BootImageSize(boot.len()))?;
        let header = CartridgeHeader::extract_from_rom(&cart)?;
        let mbc = MemoryBankController::new(header.cartridge_type)?;
        info!(
            "Loaded cartridge {:?}: type 0x{:0>2X} ({}), {} bytes",
            header.title(),
            header.cartridge_type,
            mbc.kind(),
            cart.len()
        );
        if !header.checksum_matches() {
            warn!(
                "Cartridge header checksum 0x{:0>2X} does not match its contents",
                header.header_checksum
            );
        }
        if header.claimed_rom_len().is_some_and(|len| len != cart.len()) {
            warn!(
                "Cartridge header claims ROM size code {} but the image is {} bytes",
                header.rom_size,
                cart.len()
            );
        }
        Ok(Self {
            ram: vec![0; 0x10000].into_boxed_slice(),
            boot,
            overlay: true,
            cart,
            mbc,
            io: IoRegisters::default(),
        })
    }

    fn read_cart(&self, addr: u16) -> u8 {
        let offset = self.mbc.rom_offset(addr);
        match self.cart.get(offset) {
            Some(byte) => *byte,
            None => {
                trace!("Open bus read of cartridge offset 0x{offset:X} (0x{addr:0>4X})");
                0xFF
            }
        }
    }

    /// Whether reads below 0x100 still see the boot image.
    pub fn overlay_active(&self) -> bool {
        self.overlay
    }

    pub fn mbc(&self) -> &MemoryBankController {
        &self.mbc
    }

    pub fn io(&self) -> &IoRegisters {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IoRegisters {
        &mut self.io
    }
}

#[cfg(test)]
impl MemoryLike for Vec<u8> {
    fn read_byte(&self, addr: u16) -> u8 {
        self[addr as usize]
    }

    fn write_byte(&mut self, addr: u16, val: u8) -> Result<(), Fatal> {
        self[addr as usize] = val;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart(kind: u8, banks: usize) -> Vec<u8> {
        let mut cart = vec![0; banks * ROM_BANK_SIZE];
        cart[0x147] = kind;
        for (bank, chunk) in cart.chunks_mut(ROM_BANK_SIZE).enumerate().skip(1) {
            chunk[0] = bank as u8;
        }
        cart
    }

    fn boot() -> Vec<u8> {
        (0..=0xFF).map(|b| !b).collect()
    }

    #[test]
    fn boot_image_size_is_checked() {
        assert_eq!(
            MemoryMap::new(&[0; 255], cart(0, 2)).unwrap_err(),
            Fatal::BootImageSize(255)
        );
        assert_eq!(
            MemoryMap::new(&boot(), vec![0; 0x14F]).unwrap_err(),
            Fatal::CartridgeTooSmall(0x14F)
        );
    }

    #[test]
    fn overlay_hides_the_cartridge() {
        let mut cart = cart(0, 2);
        cart[0x00FF] = 0x42;
        cart[0x0100] = 0x24;
        let mut mem = MemoryMap::new(&boot(), cart).unwrap();
        assert_eq!(mem.read_byte(0x0000), 0xFF);
        assert_eq!(mem.read_byte(0x00FF), 0x00);
        assert_eq!(mem.read_byte(0x0100), 0x24);
        mem.write_byte(BOOT_DISABLE, 0).unwrap();
        assert!(mem.overlay_active());
        mem.write_byte(BOOT_DISABLE, 1).unwrap();
        assert!(!mem.overlay_active());
        assert_eq!(mem.read_byte(0x00FF), 0x42);
        assert_eq!(mem.read_byte(BOOT_DISABLE), 1);
    }

    #[test]
    fn direct_cartridge_ignores_rom_writes() {
        let mut mem = MemoryMap::new(&boot(), cart(0, 2)).unwrap();
        mem.write_byte(0x4000, 0x99).unwrap();
        assert_eq!(mem.read_byte(0x4000), 1);
        mem.write_byte(0x2000, 0x03).unwrap();
        assert_eq!(mem.mbc().rom_bank(), 1);
    }

    #[test]
    fn banked_reads_and_open_bus() {
        let mut mem = MemoryMap::new(&boot(), cart(0x11, 4)).unwrap();
        assert_eq!(mem.read_byte(0x4000), 1);
        mem.write_byte(0x2000, 3).unwrap();
        assert_eq!(mem.read_byte(0x4000), 3);
        mem.write_byte(0x2000, 0x40).unwrap();
        assert_eq!(mem.read_byte(0x4000), 0xFF);
        assert_eq!(
            mem.write_byte(0x0000, 0x0A),
            Err(Fatal::UnimplementedBankControl {
                address: 0x0000,
                value: 0x0A
            })
        );
    }

    #[test]
    fn unclaimed_addresses_are_ram() {
        let mut mem = MemoryMap::new(&boot(), cart(0, 2)).unwrap();
        for addr in [0x8000, 0x9FFF, 0xC000, 0xFE00, 0xFF00, 0xFF15, 0xFF46, 0xFF80, 0xFFFF] {
            mem.write_byte(addr, 0x5A).unwrap();
            assert_eq!(mem.read_byte(addr), 0x5A, "0x{addr:0>4X}");
        }
    }
}
