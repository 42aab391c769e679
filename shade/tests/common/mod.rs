#![allow(dead_code)]

use shade::mem::ROM_BANK_SIZE;

/// A cartridge of `banks` 16 KiB banks with the given type byte and a valid header checksum. The
/// first byte of every switchable bank holds that bank's number.
pub fn cartridge(kind: u8, banks: usize) -> Vec<u8> {
    let mut cart = vec![0; banks * ROM_BANK_SIZE];
    cart[0x134..0x139].copy_from_slice(b"SHADE");
    cart[0x147] = kind;
    cart[0x14D] = cart[0x134..0x14D]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
    for (bank, chunk) in cart.chunks_mut(ROM_BANK_SIZE).enumerate().skip(1) {
        chunk[0] = bank as u8;
    }
    cart
}

/// A 256 byte boot image that starts with `program` and is padded with `NOP`s.
pub fn boot(program: &[u8]) -> Vec<u8> {
    let mut boot = vec![0; 0x100];
    boot[..program.len()].copy_from_slice(program);
    boot
}

/// Encodes a number below 100 as packed BCD.
pub fn bcd(n: u8) -> u8 {
    ((n / 10) << 4) | (n % 10)
}

/// Decodes packed BCD.
pub fn from_bcd(b: u8) -> u8 {
    (b >> 4) * 10 + (b & 0xF)
}
