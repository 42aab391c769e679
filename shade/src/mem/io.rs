use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{apu::Channel, cpu::check_bit_const, ppu::PpuMode};

use super::selective_write;

/// The five registers of one sound channel. Square 2 and noise have no sweep register, so their
/// `sweep` stays 0 and is never mapped.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelRegisters {
    /// NRx0
    pub sweep: u8,
    /// NRx1
    pub length: u8,
    /// NRx2. Starting volume in bits 7-4, direction in bit 3, step length in bits 2-0.
    pub envelope: u8,
    /// NRx3. The low eight period bits for the square channels, the clock shift and divider for
    /// noise.
    pub frequency: u8,
    /// NRx4. Bit 7 is the trigger, bits 2-0 are the high period bits.
    pub control: u8,
}

impl ChannelRegisters {
    pub const fn triggered(&self) -> bool {
        check_bit_const::<7>(self.control)
    }

    /// The 11-bit period value of a square channel.
    pub const fn period_value(&self) -> u16 {
        ((self.control as u16 & 0x7) << 8) | self.frequency as u16
    }
}

/// ADDR FF10-FF14, FF16-FF19, FF20-FF23
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioRegisters {
    channels: [ChannelRegisters; 3],
}

impl AudioRegisters {
    pub fn channel(&self, channel: Channel) -> &ChannelRegisters {
        &self.channels[channel.index()]
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelRegisters {
        &mut self.channels[channel.index()]
    }

    /// Splits an address into the channel and which of its registers (0 through 4) it names.
    fn locate(index: u16) -> Option<(Channel, u16)> {
        match index {
            0xFF10..=0xFF14 => Some((Channel::Square1, index - 0xFF10)),
            0xFF16..=0xFF19 => Some((Channel::Square2, index - 0xFF15)),
            0xFF20..=0xFF23 => Some((Channel::Noise, index - 0xFF1F)),
            _ => None,
        }
    }

    /// Reads back with the DMG masks applied. Bits that are write-only read as 1.
    fn read_byte(&self, index: u16) -> Option<u8> {
        let (channel, reg) = Self::locate(index)?;
        let regs = self.channel(channel);
        let val = match (channel, reg) {
            (_, 0) => regs.sweep | 0x80,
            (Channel::Noise, 1) => 0xFF,
            (_, 1) => regs.length | 0x3F,
            (_, 2) => regs.envelope,
            (Channel::Noise, 3) => regs.frequency,
            (_, 3) => 0xFF,
            _ => regs.control | 0xBF,
        };
        Some(val)
    }

    fn write_byte(&mut self, index: u16, value: u8) -> bool {
        let Some((channel, reg)) = Self::locate(index) else {
            return false;
        };
        let regs = self.channel_mut(channel);
        match reg {
            0 => regs.sweep = value,
            1 => regs.length = value,
            2 => regs.envelope = value,
            3 => regs.frequency = value,
            _ => regs.control = value,
        }
        true
    }
}

/// The memory-mapped registers the core gives meaning to. Every other address in 0xFF00-0xFFFF is
/// plain RAM.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IoRegisters {
    /// ADDR FF10-FF23
    pub audio: AudioRegisters,
    /// ADDR FF40
    pub lcd_control: u8,
    /// ADDR FF41. The low three bits belong to the PPU.
    lcd_status: u8,
    /// ADDR FF42 & FF43
    pub bg_position: (u8, u8),
    /// ADDR FF44 (set by the PPU)
    lcd_y: u8,
    /// ADDR FF45
    lcd_cmp: u8,
    /// ADDR FF47
    pub bg_palette: u8,
}

// FF40 -> LCD control register
// FF41 -> LCD status register
// FF42 & FF43 -> Background viewport position (SCY, SCX)
// FF44 -> LCD Y coordinate (read only)
// FF45 -> LY compare
// FF47 -> Monochrome BG palette data

impl IoRegisters {
    pub fn lcd_status(&self) -> u8 {
        self.lcd_status
    }

    pub fn lcd_y(&self) -> u8 {
        self.lcd_y
    }

    pub fn lcd_cmp(&self) -> u8 {
        self.lcd_cmp
    }

    pub fn scroll_y(&self) -> u8 {
        self.bg_position.0
    }

    pub fn scroll_x(&self) -> u8 {
        self.bg_position.1
    }

    pub(crate) fn set_ppu_mode(&mut self, mode: PpuMode) {
        self.lcd_status = (self.lcd_status & 0b1111_1100) | mode as u8;
    }

    pub(crate) fn set_lcd_y(&mut self, line: u8) {
        self.lcd_y = line;
        self.update_coincidence();
    }

    /// STAT bit 2 reports LY == LYC.
    fn update_coincidence(&mut self) {
        let bit = ((self.lcd_y == self.lcd_cmp) as u8) << 2;
        self.lcd_status = (self.lcd_status & 0b1111_1011) | bit;
    }

    /// Returns `None` for addresses these registers do not back.
    pub(crate) fn read_byte(&self, index: u16) -> Option<u8> {
        match index {
            0xFF10..=0xFF23 => self.audio.read_byte(index),
            0xFF40 => Some(self.lcd_control),
            0xFF41 => Some(self.lcd_status),
            0xFF42 => Some(self.bg_position.0),
            0xFF43 => Some(self.bg_position.1),
            0xFF44 => Some(self.lcd_y),
            0xFF45 => Some(self.lcd_cmp),
            0xFF47 => Some(self.bg_palette),
            _ => None,
        }
    }

    /// Returns `false` for addresses these registers do not back, which leaves the write to the
    /// caller.
    pub(crate) fn write_byte(&mut self, index: u16, value: u8) -> bool {
        match index {
            0xFF10..=0xFF23 => return self.audio.write_byte(index, value),
            0xFF40 => self.lcd_control = value,
            0xFF41 => selective_write(&mut self.lcd_status, value, 0b1111_1000),
            0xFF42 => self.bg_position.0 = value,
            0xFF43 => self.bg_position.1 = value,
            0xFF44 => trace!("Ignoring write of 0x{value:0>2X} to LY"),
            0xFF45 => {
                self.lcd_cmp = value;
                self.update_coincidence();
            }
            0xFF47 => self.bg_palette = value,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_low_bits_are_read_only() {
        let mut io = IoRegisters::default();
        io.set_ppu_mode(PpuMode::Drawing);
        assert!(io.write_byte(0xFF41, 0xFF));
        assert_eq!(io.lcd_status(), 0b1111_1011);
        assert!(io.write_byte(0xFF41, 0x00));
        assert_eq!(io.lcd_status(), 0b0000_0011);
    }

    #[test]
    fn coincidence_follows_ly_and_lyc() {
        let mut io = IoRegisters::default();
        io.set_lcd_y(10);
        assert_eq!(io.lcd_status() & 0b100, 0);
        io.write_byte(0xFF45, 10);
        assert_eq!(io.lcd_status() & 0b100, 0b100);
        io.set_lcd_y(11);
        assert_eq!(io.lcd_status() & 0b100, 0);
    }

    #[test]
    fn ly_ignores_writes() {
        let mut io = IoRegisters::default();
        io.set_lcd_y(42);
        assert!(io.write_byte(0xFF44, 0));
        assert_eq!(io.read_byte(0xFF44), Some(42));
    }

    #[test]
    fn audio_read_back_masks() {
        let mut io = IoRegisters::default();
        for addr in (0xFF10..=0xFF14).chain(0xFF16..=0xFF19).chain(0xFF20..=0xFF23) {
            assert!(io.write_byte(addr, 0x00));
        }
        assert_eq!(io.read_byte(0xFF10), Some(0x80));
        assert_eq!(io.read_byte(0xFF11), Some(0x3F));
        assert_eq!(io.read_byte(0xFF12), Some(0x00));
        assert_eq!(io.read_byte(0xFF13), Some(0xFF));
        assert_eq!(io.read_byte(0xFF14), Some(0xBF));
        assert_eq!(io.read_byte(0xFF16), Some(0x3F));
        assert_eq!(io.read_byte(0xFF18), Some(0xFF));
        assert_eq!(io.read_byte(0xFF20), Some(0xFF));
        assert_eq!(io.read_byte(0xFF22), Some(0x00));
        assert_eq!(io.read_byte(0xFF23), Some(0xBF));
        assert_eq!(io.read_byte(0xFF15), None);
        assert_eq!(io.read_byte(0xFF1F), None);
        assert!(!io.write_byte(0xFF15, 0x12));
    }

    #[test]
    fn audio_writes_land_in_the_right_channel() {
        let mut io = IoRegisters::default();
        io.write_byte(0xFF17, 0xF3);
        io.write_byte(0xFF18, 0x34);
        io.write_byte(0xFF19, 0x87);
        let regs = io.audio.channel(Channel::Square2);
        assert_eq!(regs.envelope, 0xF3);
        assert_eq!(regs.period_value(), 0x734);
        assert!(regs.triggered());
        io.write_byte(0xFF21, 0x42);
        assert_eq!(io.audio.channel(Channel::Noise).envelope, 0x42);
    }
}
