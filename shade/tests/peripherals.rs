use shade::{apu::ENVELOPE_STEP_CYCLES, ppu::SCREEN_HEIGHT, AudioEvent, Channel, Gameboy};

mod common;
use common::{boot, cartridge};

#[test]
fn blank_tiles_take_palette_color_zero() {
    // LD A, 0x91; LDH (0x40), A; LD A, 0xE6; LDH (0x47), A; JR -2
    let program = [0x3E, 0x91, 0xE0, 0x40, 0x3E, 0xE6, 0xE0, 0x47, 0x18, 0xFE];
    let mut gb = Gameboy::new(&boot(&program), cartridge(0x00, 2)).unwrap();
    gb.next_frame().unwrap();
    for line in 0..SCREEN_HEIGHT as u8 {
        let row = gb.ppu.scanline(line).unwrap();
        assert!(row.iter().all(|&shade| shade == 0xE6 & 0b11), "line {line}");
    }
    assert!(gb.ppu.scanline(SCREEN_HEIGHT as u8).is_none());
}

#[test]
fn tile_data_reaches_the_screen() {
    // LD HL, 0x8000; LD A, 0xFF; LD (HL+), A; LD (HL+), A; LD A, 0x91; LDH (0x40), A;
    // LD A, 0xE4; LDH (0x47), A; JR -2
    let program = [
        0x21, 0x00, 0x80, 0x3E, 0xFF, 0x22, 0x22, 0x3E, 0x91, 0xE0, 0x40, 0x3E, 0xE4, 0xE0, 0x47,
        0x18, 0xFE,
    ];
    let mut gb = Gameboy::new(&boot(&program), cartridge(0x00, 2)).unwrap();
    gb.next_frame().unwrap();
    // Only the first row of tile 0 is set, and every map entry points at tile 0.
    for line in 0..SCREEN_HEIGHT as u8 {
        let row = gb.ppu.scanline(line).unwrap();
        let expected = if line % 8 == 0 { 3 } else { 0 };
        assert!(row.iter().all(|&shade| shade == expected), "line {line}");
    }
}

#[test]
fn envelope_runs_from_register_writes() {
    // LD A, 0xF1; LDH (0x12), A; LD A, 0x87; LDH (0x14), A; JR -2
    let program = [0x3E, 0xF1, 0xE0, 0x12, 0x3E, 0x87, 0xE0, 0x14, 0x18, 0xFE];
    let mut gb = Gameboy::new(&boot(&program), cartridge(0x00, 2)).unwrap();
    let events = gb.next_frame().unwrap();
    assert_eq!(
        events.first(),
        Some(&AudioEvent::Trigger {
            channel: Channel::Square1,
            period: 2048 - 0x700,
            volume: 15
        })
    );
    assert!(events.contains(&AudioEvent::Volume {
        channel: Channel::Square1,
        volume: 14
    }));
    assert!(gb.apu.channel(Channel::Square1).enabled);
}

#[test]
fn zero_volume_increasing_trigger_still_starts() {
    // LD A, 0x08; LDH (0x17), A; LD A, 0x80; LDH (0x19), A; JR -2
    let program = [0x3E, 0x08, 0xE0, 0x17, 0x3E, 0x80, 0xE0, 0x19, 0x18, 0xFE];
    let mut gb = Gameboy::new(&boot(&program), cartridge(0x00, 2)).unwrap();
    let events = gb.next_frame().unwrap();
    assert_eq!(
        events,
        vec![AudioEvent::Trigger {
            channel: Channel::Square2,
            period: 2048,
            volume: 0
        }]
    );
}

#[test]
fn envelope_steps_after_exactly_one_period_of_ticks() {
    // LD A, 0xA1; LDH (0x17), A; LD A, 0x80; LDH (0x19), A; JR -2
    let program = [0x3E, 0xA1, 0xE0, 0x17, 0x3E, 0x80, 0xE0, 0x19, 0x18, 0xFE];
    let mut gb = Gameboy::new(&boot(&program), cartridge(0x00, 2)).unwrap();
    loop {
        let tick = gb.tick().unwrap();
        if !tick.audio.is_empty() {
            assert_eq!(
                tick.audio.as_slice(),
                &[AudioEvent::Trigger {
                    channel: Channel::Square2,
                    period: 2048,
                    volume: 10
                }]
            );
            break;
        }
    }

    let mut elapsed = 0u32;
    loop {
        let tick = gb.tick().unwrap();
        elapsed += tick.cycles as u32;
        if elapsed < ENVELOPE_STEP_CYCLES {
            assert!(tick.audio.is_empty(), "{elapsed} units in");
            assert_eq!(gb.apu.channel(Channel::Square2).envelope.volume(), 10);
        } else {
            assert_eq!(
                tick.audio.as_slice(),
                &[AudioEvent::Volume {
                    channel: Channel::Square2,
                    volume: 9
                }]
            );
            break;
        }
    }
}
