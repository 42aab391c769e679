use heapless::Vec as InlineVec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    cpu::check_bit_const,
    mem::{MemoryLike, MemoryMap},
};

// Notes:
// A tile is 16 bytes, which means that each line is 2 bytes.
// Every pixel has a color-depth of 2. The nth bit of the first byte holds the nth pixel's least
// significant bit of the color depth. The most significant bit is in the corresponding bit of
// second byte. The leftmost pixel is bit 7.

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

/// One row of background shades, already mapped through BGP (0 is the lightest).
pub type Scanline = [u8; SCREEN_WIDTH];

const OAM_SCAN_DOTS: u16 = 80;
const DRAWING_DOTS: u16 = 172;
const HBLANK_DOTS: u16 = 204;
/// Every scanline, visible or not, is this long.
pub const LINE_DOTS: u16 = 456;
const LAST_LINE: u8 = 153;
/// The number of clock units from one VBlank to the next.
pub const FRAME_DOTS: u32 = LINE_DOTS as u32 * (LAST_LINE as u32 + 1);

/// The mode bits reported in STAT.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[repr(u8)]
pub enum PpuMode {
    /// Also refered to as "Mode 0" in the pandocs.
    HBlank = 0,
    /// Also refered to as "Mode 1" in the pandocs.
    VBlank = 1,
    /// Also refered to as "Mode 2" in the pandocs.
    #[default]
    OamScan = 2,
    /// Also refered to as "Mode 3" in the pandocs.
    Drawing = 3,
}

/// Side effects of advancing the PPU that a frontend cares about.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
pub enum PpuSignal {
    /// The given line of the screen buffer was just rendered.
    #[display("Scanline({_0})")]
    Scanline(u8),
    /// The last visible line is done. The screen buffer holds a complete frame.
    #[display("VBlank")]
    VBlank,
}

/// A single tick covers at most 255 units, which is less than one line. That spans no more than a
/// scanline and a VBlank.
pub type PpuSignals = InlineVec<PpuSignal, 2>;

/// The Pixel Processing Unit. Only the background layer is drawn.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Ppu {
    /// Represents the LCD screen. The length of this will always be 144.
    screen: Vec<Scanline>,
    /// The state machine and the units spent in the current state.
    pub inner: PpuInner,
    /// The current scanline, mirrored into LY.
    line: u8,
    /// The number of times VBlank has been entered.
    frames: u64,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum PpuInner {
    OamScan { dots: u16 },
    Drawing { dots: u16 },
    HBlank { dots: u16 },
    VBlank { dots: u16 },
}

impl Default for PpuInner {
    fn default() -> Self {
        Self::OamScan { dots: 0 }
    }
}

impl PpuInner {
    fn state(&self) -> PpuMode {
        match self {
            PpuInner::OamScan { .. } => PpuMode::OamScan,
            PpuInner::Drawing { .. } => PpuMode::Drawing,
            PpuInner::HBlank { .. } => PpuMode::HBlank,
            PpuInner::VBlank { .. } => PpuMode::VBlank,
        }
    }

    fn dots_mut(&mut self) -> &mut u16 {
        match self {
            PpuInner::OamScan { dots }
            | PpuInner::Drawing { dots }
            | PpuInner::HBlank { dots }
            | PpuInner::VBlank { dots } => dots,
        }
    }

    /// Returns the units left over once the current state has run its full length.
    fn surplus(&self) -> Option<u16> {
        let (dots, length) = match *self {
            PpuInner::OamScan { dots } => (dots, OAM_SCAN_DOTS),
            PpuInner::Drawing { dots } => (dots, DRAWING_DOTS),
            PpuInner::HBlank { dots } => (dots, HBLANK_DOTS),
            PpuInner::VBlank { dots } => (dots, LINE_DOTS),
        };
        dots.checked_sub(length)
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            screen: vec![[0; SCREEN_WIDTH]; SCREEN_HEIGHT],
            inner: PpuInner::default(),
            line: 0,
            frames: 0,
        }
    }

    /// Writes the power-on mode and line into STAT and LY.
    pub(crate) fn sync_registers(&self, mem: &mut MemoryMap) {
        let io = mem.io_mut();
        io.set_ppu_mode(self.state());
        io.set_lcd_y(self.line);
    }

    pub fn state(&self) -> PpuMode {
        self.inner.state()
    }

    pub fn line(&self) -> u8 {
        self.line
    }

    /// The number of frames completed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn screen(&self) -> &[Scanline] {
        &self.screen
    }

    /// Returns `None` for lines past the bottom of the screen.
    pub fn scanline(&self, line: u8) -> Option<&Scanline> {
        self.screen.get(line as usize)
    }

    /// Advances the state machine by the given number of clock units. Leftover units carry into
    /// the next state, so the boundaries land on the same units no matter how the time is split.
    pub fn tick(&mut self, cycles: u8, mem: &mut MemoryMap) -> PpuSignals {
        let mut signals = PpuSignals::new();
        *self.inner.dots_mut() += cycles as u16;
        while let Some(dots) = self.inner.surplus() {
            self.inner = match self.inner {
                PpuInner::OamScan { .. } => PpuInner::Drawing { dots },
                PpuInner::Drawing { .. } => {
                    self.render_scanline(mem);
                    emit(&mut signals, PpuSignal::Scanline(self.line));
                    PpuInner::HBlank { dots }
                }
                PpuInner::HBlank { .. } => {
                    self.set_line(self.line + 1, mem);
                    if self.line as usize == SCREEN_HEIGHT {
                        self.frames += 1;
                        debug!("Frame {} complete", self.frames);
                        emit(&mut signals, PpuSignal::VBlank);
                        PpuInner::VBlank { dots }
                    } else {
                        PpuInner::OamScan { dots }
                    }
                }
                PpuInner::VBlank { .. } if self.line == LAST_LINE => {
                    self.set_line(0, mem);
                    PpuInner::OamScan { dots }
                }
                PpuInner::VBlank { .. } => {
                    self.set_line(self.line + 1, mem);
                    PpuInner::VBlank { dots }
                }
            };
            mem.io_mut().set_ppu_mode(self.state());
        }
        signals
    }

    fn set_line(&mut self, line: u8, mem: &mut MemoryMap) {
        self.line = line;
        mem.io_mut().set_lcd_y(line);
    }

    /// Draws the background for the current line into the screen buffer.
    fn render_scanline(&mut self, mem: &MemoryMap) {
        let Some(row) = self.screen.get_mut(self.line as usize) else {
            return;
        };
        let io = mem.io();
        let control = io.lcd_control;
        if !check_bit_const::<0>(control) {
            row.fill(0);
            return;
        }
        let map_base: u16 = if check_bit_const::<3>(control) {
            0x9C00
        } else {
            0x9800
        };
        let unsigned_indexing = check_bit_const::<4>(control);
        let palette = io.bg_palette;

        let y = self.line.wrapping_add(io.scroll_y());
        let map_row = (y / 8) as u16;
        let pixel_row = (y % 8) as u16;
        let x = io.scroll_x();
        let mut map_col = x / 8;
        let mut pixel = x % 8;

        for shade in row.iter_mut() {
            let tile = mem.read_byte(map_base + map_row * 32 + map_col as u16);
            let tile_addr = tile_data_address(tile, unsigned_indexing) + pixel_row * 2;
            let lo = mem.read_byte(tile_addr);
            let hi = mem.read_byte(tile_addr + 1);
            let bit = 7 - pixel;
            let color = (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1);
            *shade = (palette >> (2 * color)) & 0b11;
            pixel += 1;
            if pixel == 8 {
                pixel = 0;
                map_col = (map_col + 1) % 32;
            }
        }
    }
}

/// LCDC bit 4 picks between unsigned indexing from 0x8000 and signed indexing from 0x9000.
fn tile_data_address(tile: u8, unsigned_indexing: bool) -> u16 {
    if unsigned_indexing {
        0x8000 + tile as u16 * 16
    } else {
        0x9000u16.wrapping_add_signed(tile as i8 as i16 * 16)
    }
}

fn emit(signals: &mut PpuSignals, signal: PpuSignal) {
    if signals.push(signal).is_err() {
        warn!("Dropped PPU signal {signal}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> MemoryMap {
        let mut cart = vec![0; 0x8000];
        cart[0x147] = 0x00;
        MemoryMap::new(&[0; 0x100], cart).unwrap()
    }

    /// Ticks in instruction-sized chunks until `total` units have passed.
    fn run(ppu: &mut Ppu, mem: &mut MemoryMap, total: u32) -> Vec<PpuSignal> {
        let mut signals = Vec::new();
        let mut left = total;
        while left > 0 {
            let step = left.min(12) as u8;
            signals.extend(ppu.tick(step, mem));
            left -= step as u32;
        }
        signals
    }

    #[test]
    fn tile_addressing_modes() {
        assert_eq!(tile_data_address(0, true), 0x8000);
        assert_eq!(tile_data_address(0xFF, true), 0x8FF0);
        assert_eq!(tile_data_address(0, false), 0x9000);
        assert_eq!(tile_data_address(0x7F, false), 0x97F0);
        assert_eq!(tile_data_address(0x80, false), 0x8800);
        assert_eq!(tile_data_address(0xFF, false), 0x8FF0);
    }

    #[test]
    fn mode_sequence_of_a_visible_line() {
        let mut mem = memory();
        let mut ppu = Ppu::new();
        ppu.sync_registers(&mut mem);
        assert_eq!(mem.io().lcd_status() & 0b11, PpuMode::OamScan as u8);

        assert!(ppu.tick(79, &mut mem).is_empty());
        assert_eq!(ppu.state(), PpuMode::OamScan);
        ppu.tick(1, &mut mem);
        assert_eq!(ppu.state(), PpuMode::Drawing);
        assert_eq!(mem.io().lcd_status() & 0b11, PpuMode::Drawing as u8);

        let signals = ppu.tick(172, &mut mem);
        assert_eq!(signals.as_slice(), &[PpuSignal::Scanline(0)]);
        assert_eq!(ppu.state(), PpuMode::HBlank);

        ppu.tick(203, &mut mem);
        assert_eq!(ppu.line(), 0);
        ppu.tick(1, &mut mem);
        assert_eq!(ppu.line(), 1);
        assert_eq!(mem.io().lcd_y(), 1);
        assert_eq!(ppu.state(), PpuMode::OamScan);
    }

    #[test]
    fn surplus_carries_into_the_next_state() {
        let mut mem = memory();
        let mut ppu = Ppu::new();
        ppu.tick(78, &mut mem);
        ppu.tick(8, &mut mem);
        assert_eq!(ppu.inner, PpuInner::Drawing { dots: 6 });
    }

    #[test]
    fn a_line_is_456_units_and_a_frame_is_70224() {
        let mut mem = memory();
        let mut ppu = Ppu::new();
        run(&mut ppu, &mut mem, LINE_DOTS as u32);
        assert_eq!(ppu.line(), 1);
        assert_eq!(ppu.state(), PpuMode::OamScan);

        let signals = run(&mut ppu, &mut mem, FRAME_DOTS - LINE_DOTS as u32);
        assert_eq!(FRAME_DOTS, 70_224);
        assert_eq!(ppu.line(), 0);
        assert_eq!(ppu.state(), PpuMode::OamScan);
        assert_eq!(ppu.frames(), 1);
        let scanlines = signals
            .iter()
            .filter(|s| matches!(s, PpuSignal::Scanline(_)))
            .count();
        assert_eq!(scanlines, SCREEN_HEIGHT - 1);
        assert_eq!(
            signals.iter().filter(|s| **s == PpuSignal::VBlank).count(),
            1
        );
    }

    #[test]
    fn vblank_spans_ten_lines() {
        let mut mem = memory();
        let mut ppu = Ppu::new();
        let signals = run(&mut ppu, &mut mem, LINE_DOTS as u32 * 144);
        assert_eq!(signals.last(), Some(&PpuSignal::VBlank));
        assert_eq!(ppu.state(), PpuMode::VBlank);
        assert_eq!(ppu.line(), 144);
        assert_eq!(mem.io().lcd_status() & 0b11, PpuMode::VBlank as u8);
        run(&mut ppu, &mut mem, LINE_DOTS as u32 * 9);
        assert_eq!(ppu.line(), 153);
        assert_eq!(ppu.state(), PpuMode::VBlank);
        run(&mut ppu, &mut mem, LINE_DOTS as u32);
        assert_eq!(ppu.line(), 0);
        assert_eq!(ppu.state(), PpuMode::OamScan);
    }

    #[test]
    fn disabled_background_is_blank() {
        let mut mem = memory();
        mem.write_byte(0xFF47, 0xFF).unwrap();
        mem.write_byte(0x8000, 0xFF).unwrap();
        let mut ppu = Ppu::new();
        let signals = ppu.tick(252, &mut mem);
        assert_eq!(signals.as_slice(), &[PpuSignal::Scanline(0)]);
        assert_eq!(ppu.scanline(0), Some(&[0; SCREEN_WIDTH]));
    }

    /// Corrected plane order: the first byte of a tile row is the low bit of the color index and
    /// the second byte is the high bit. A pixel with both planes set is index 3. The unparenthesized
    /// `lo ? 1 : 0 + hi ? 2 : 0` reading, which yields 1 for that pixel, is not reproduced.
    #[test]
    fn corrected_plane_order_first_byte_is_low_bit() {
        let mut mem = memory();
        // BG on, unsigned tile data, map at 0x9800, identity palette
        mem.write_byte(0xFF40, 0b1001_0001).unwrap();
        mem.write_byte(0xFF47, 0b1110_0100).unwrap();
        // Tile 1: first plane in column 0, second plane in column 1, both in column 2
        mem.write_byte(0x8010, 0b1010_0000).unwrap();
        mem.write_byte(0x8011, 0b0110_0000).unwrap();
        mem.write_byte(0x9800, 1).unwrap();

        let mut ppu = Ppu::new();
        ppu.tick(252, &mut mem);
        let line = ppu.scanline(0).unwrap();
        assert_eq!(line[0], 1, "first plane only");
        assert_eq!(line[1], 2, "second plane only");
        assert_eq!(line[2], 3, "both planes");
        assert_eq!(line[3], 0);
        assert!(line[8..].iter().all(|&s| s == 0));

        // Line 1 with SCY = 255 reads tile row 0 again. SCX = 1 moves the tile one pixel left.
        mem.write_byte(0xFF42, 255).unwrap();
        mem.write_byte(0xFF43, 1).unwrap();
        ppu.tick(204, &mut mem);
        ppu.tick(252, &mut mem);
        assert_eq!(ppu.line(), 1);
        let line = ppu.scanline(1).unwrap();
        assert_eq!(&line[..3], &[2, 3, 0]);
        assert!(line[3..].iter().all(|&s| s == 0));
    }

    #[test]
    fn scroll_wraps_the_map() {
        let mut mem = memory();
        mem.write_byte(0xFF40, 0b1001_1001).unwrap();
        mem.write_byte(0xFF47, 0b1110_0100).unwrap();
        // Map row 31, column 31 of the 0x9C00 map points at tile 2, whose last row is solid.
        mem.write_byte(0x9C00 + 31 * 32 + 31, 2).unwrap();
        mem.write_byte(0x8020 + 14, 0xFF).unwrap();
        mem.write_byte(0x8020 + 15, 0xFF).unwrap();
        mem.write_byte(0xFF42, 255).unwrap();
        mem.write_byte(0xFF43, 248).unwrap();

        let mut ppu = Ppu::new();
        ppu.tick(252, &mut mem);
        let line = ppu.scanline(0).unwrap();
        assert!(line[..8].iter().all(|&s| s == 3));
        assert!(line[8..].iter().all(|&s| s == 0));
    }
}
