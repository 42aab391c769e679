use crate::Fatal;

/// This struct represents a DMG ROM header. Per the Pan Docs, the header of the ROM occupies the
/// region between `0x100` and `0x14F`. Only the fields the core reports on are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    /// The memory region between `0x134` and `0x143`. If the title is shorter than 16 characters,
    /// the rest of the array is zero-padded.
    title: [u8; 16],
    /// The byte at `0x147`, which selects the bank controller.
    pub cartridge_type: u8,
    /// The byte at `0x148`. The ROM is `32 KiB << rom_size` long.
    pub rom_size: u8,
    /// The byte at `0x149`.
    pub ram_size: u8,
    /// The byte at `0x14D`. The boot image refuses to hand over to a cartridge whose header does
    /// not sum to this value. Computing the checksum directly from the byte string looks like
    /// this:
    /// ```rust
    /// # let rom = [0u8; 0x150];
    /// let mut checksum = 0u8;
    /// for &b in &rom[0x134..0x14D] {
    ///     checksum = checksum.wrapping_sub(b).wrapping_sub(1);
    /// }
    /// ```
    pub header_checksum: u8,
    /// Computed from the image, not read from it.
    computed_checksum: u8,
}

impl CartridgeHeader {
    /// The last byte of the header. The global checksum at `0x14E` is not checked by anything on
    /// the DMG and is not kept, but it still has to be present.
    pub const END_ADDR: usize = 0x14F;

    pub fn extract_from_rom(rom: &[u8]) -> Result<Self, Fatal> {
        if rom.len() <= Self::END_ADDR {
            return Err(Fatal::CartridgeTooSmall(rom.len()));
        }
        let mut title = [0; 16];
        title.copy_from_slice(&rom[0x134..=0x143]);
        let computed_checksum = rom[0x134..0x14D]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
        Ok(Self {
            title,
            cartridge_type: rom[0x147],
            rom_size: rom[0x148],
            ram_size: rom[0x149],
            header_checksum: rom[0x14D],
            computed_checksum,
        })
    }

    /// The title with its zero padding removed. Non-ASCII bytes are replaced.
    pub fn title(&self) -> String {
        let end = self.title.iter().position(|&b| b == 0).unwrap_or(self.title.len());
        String::from_utf8_lossy(&self.title[..end]).into_owned()
    }

    pub fn checksum_matches(&self) -> bool {
        self.header_checksum == self.computed_checksum
    }

    /// The ROM size the header claims, in bytes.
    pub fn claimed_rom_len(&self) -> Option<usize> {
        (self.rom_size <= 8).then(|| 0x8000 << self.rom_size)
    }
}

#[cfg(test)]
mod tests {
    use crate::rom::CartridgeHeader;
    use crate::Fatal;

    fn rom_with_title(title: &[u8]) -> Vec<u8> {
        let mut rom = vec![0; 0x8000];
        rom[0x134..0x134 + title.len()].copy_from_slice(title);
        rom[0x147] = 0x11;
        rom[0x148] = 0x02;
        rom[0x14D] = rom[0x134..0x14D]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
        rom
    }

    #[test]
    fn header_fields() {
        let rom = rom_with_title(b"SHADE");
        let header = CartridgeHeader::extract_from_rom(&rom).unwrap();
        assert_eq!(header.title(), "SHADE");
        assert_eq!(header.cartridge_type, 0x11);
        assert_eq!(header.claimed_rom_len(), Some(128 * 1024));
        assert!(header.checksum_matches());
    }

    #[test]
    fn corrupt_checksum_is_detected() {
        let mut rom = rom_with_title(b"SHADE");
        rom[0x14D] ^= 0xFF;
        let header = CartridgeHeader::extract_from_rom(&rom).unwrap();
        assert!(!header.checksum_matches());
    }

    #[test]
    fn short_image_is_rejected() {
        assert_eq!(
            CartridgeHeader::extract_from_rom(&[0; 0x100]),
            Err(Fatal::CartridgeTooSmall(0x100))
        );
        assert_eq!(
            CartridgeHeader::extract_from_rom(&[0; CartridgeHeader::END_ADDR]),
            Err(Fatal::CartridgeTooSmall(CartridgeHeader::END_ADDR))
        );
        assert!(CartridgeHeader::extract_from_rom(&[0; CartridgeHeader::END_ADDR + 1]).is_ok());
    }
}
