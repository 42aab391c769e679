//! Shade is the core crate of this workspace. Contained here is all of the logic for emulating the
//! original (DMG) Gameboy: the CPU, the memory bus and its bank controller, the picture timing state
//! machine, and the sound channel envelopes. This crate aims to be platform agnostic and free of
//! UI-specifics. Frontends drive it one instruction at a time and consume the side effects it
//! reports.
//!
//! # Notes
//! Multi-byte immediates and stack entries are little endian. Every cycle count in this crate is
//! in clock units (4,194,304 per second), so the shortest instruction costs 4.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::error;

pub mod apu;
pub mod cpu;
mod error;
pub mod instruction;
pub mod mem;
pub mod ppu;
pub mod rom;

pub use apu::{AudioEvent, AudioEvents, Channel};
pub use cpu::Cpu;
pub use error::Fatal;
pub use mem::{MemoryLike, MemoryMap};
pub use ppu::{Ppu, PpuSignal, PpuSignals};

use apu::Apu;

/// Settings that change what the core reports, never how it executes.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emit a `trace` event for every executed instruction.
    pub trace_instructions: bool,
}

/// This is the core emulation primative. It contains the entire state machine of the emulated
/// handheld and is agnostic to usecase and how it is rendered (if at all). Notably, the `Gameboy`
/// does not provide a `run` or analogous method. It must be ticked forward.
///
/// This allows managing tick rate, processing IO, and more to be done externally.
#[derive(Debug, Clone)]
pub struct Gameboy {
    pub cpu: Cpu,
    pub mem: MemoryMap,
    pub ppu: Ppu,
    pub apu: Apu,
    config: Config,
}

/// Everything that happened during one call to [`Gameboy::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub cycles: u8,
    pub video: PpuSignals,
    pub audio: AudioEvents,
}

impl Gameboy {
    /// Powers on a machine with the given boot image mapped over the cartridge.
    pub fn new(boot: &[u8], cart: Vec<u8>) -> Result<Self, Fatal> {
        Self::with_config(boot, cart, Config::default())
    }

    pub fn with_config(boot: &[u8], cart: Vec<u8>, config: Config) -> Result<Self, Fatal> {
        let mut mem = MemoryMap::new(boot, cart)?;
        let ppu = Ppu::new();
        ppu.sync_registers(&mut mem);
        Ok(Self {
            cpu: Cpu::new(),
            mem,
            ppu,
            apu: Apu::new(),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Executes exactly one instruction and returns its cost. On failure, the dump is logged
    /// before the error is handed back.
    pub fn step(&mut self) -> Result<u8, Fatal> {
        match self.cpu.step(&mut self.mem, self.config.trace_instructions) {
            Ok(cycles) => Ok(cycles),
            Err(err) => {
                error!("{err}\n{}", self.dump());
                Err(err)
            }
        }
    }

    /// Executes one instruction, then advances the picture and sound state machines by its cost.
    pub fn tick(&mut self) -> Result<Tick, Fatal> {
        let cycles = self.step()?;
        let video = self.ppu.tick(cycles, &mut self.mem);
        let audio = self.apu.tick(cycles, &mut self.mem.io_mut().audio);
        Ok(Tick {
            cycles,
            video,
            audio,
        })
    }

    /// Ticks until the PPU enters VBlank, which leaves a complete frame in [`Ppu::screen`]. Returns
    /// the audio events that happened along the way.
    pub fn next_frame(&mut self) -> Result<Vec<AudioEvent>, Fatal> {
        let mut audio = Vec::new();
        loop {
            let tick = self.tick()?;
            audio.extend(tick.audio);
            if tick.video.contains(&PpuSignal::VBlank) {
                return Ok(audio);
            }
        }
    }

    /// Reads a byte the way the CPU would see it.
    pub fn read(&self, addr: u16) -> u8 {
        self.mem.read_byte(addr)
    }

    /// Whether the CPU has halted or stopped. Nothing can wake it back up.
    pub fn is_stalled(&self) -> bool {
        !self.cpu.state.is_running()
    }

    pub fn dump(&self) -> Dump<'_> {
        Dump { gb: self }
    }
}

/// A human-readable snapshot of the registers.
#[derive(Debug, Clone, Copy)]
pub struct Dump<'a> {
    gb: &'a Gameboy,
}

impl Display for Dump<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cpu = &self.gb.cpu;
        let io = self.gb.mem.io();
        writeln!(f, "======== CPU DUMP ========")?;
        writeln!(f, " A: {:02x}      F: {:02x}", cpu.a, cpu.f.as_byte())?;
        writeln!(f, " B: {:02x}      C: {:02x}", cpu.bc.hi(), cpu.bc.lo())?;
        writeln!(f, " D: {:02x}      E: {:02x}", cpu.de.hi(), cpu.de.lo())?;
        writeln!(f, " H: {:02x}      L: {:02x}", cpu.hl.hi(), cpu.hl.lo())?;
        writeln!(f, "SP: {:04x}   PC: {:04x}", cpu.sp, cpu.pc)?;
        writeln!(f, "IME: {}   State: {}", cpu.ime as u8, cpu.state)?;
        writeln!(f, "======== PPU DUMP ========")?;
        writeln!(
            f,
            "LCDC: {:02x}   STAT: {:02x}   BGP: {:02x}",
            io.lcd_control,
            io.lcd_status(),
            io.bg_palette
        )?;
        writeln!(f, " SCY: {:02x}    SCX: {:02x}", io.scroll_y(), io.scroll_x())?;
        writeln!(f, "  LY: {:02x}    LYC: {:02x}", io.lcd_y(), io.lcd_cmp())?;
        writeln!(
            f,
            "Mode: {}   Frames: {}",
            self.gb.ppu.state(),
            self.gb.ppu.frames()
        )?;
        write!(f, "==========================")
    }
}
