use heapless::Vec as InlineVec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::mem::io::{AudioRegisters, ChannelRegisters};

/// The number of clock units between two envelope steps of length 1 (1/64 of a second).
pub const ENVELOPE_STEP_CYCLES: u32 = 65_536;

const MAX_VOLUME: u8 = 15;

#[derive(
    Debug,
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
pub enum Channel {
    Square1,
    Square2,
    Noise,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Square1, Channel::Square2, Channel::Noise];

    pub const fn index(self) -> usize {
        match self {
            Channel::Square1 => 0,
            Channel::Square2 => 1,
            Channel::Noise => 2,
        }
    }

    /// The oscillator period (in the channel's own clock ticks) the registers describe.
    fn period(self, regs: &ChannelRegisters) -> u32 {
        match self {
            Channel::Square1 | Channel::Square2 => 2048 - regs.period_value() as u32,
            Channel::Noise => {
                let divisor = match regs.frequency & 0x7 {
                    0 => 8,
                    code => 16 * code as u32,
                };
                divisor << (regs.frequency >> 4)
            }
        }
    }
}

/// What a frontend has to do to its oscillators.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
pub enum AudioEvent {
    /// Start a fresh instance of the channel.
    #[display("{channel}: trigger with period {period} at volume {volume}")]
    Trigger {
        channel: Channel,
        period: u32,
        volume: u8,
    },
    #[display("{channel}: volume {volume}")]
    Volume { channel: Channel, volume: u8 },
    #[display("{channel}: stop")]
    Stop { channel: Channel },
}

/// Every channel emits at most two events per tick (a stop and a trigger).
pub type AudioEvents = InlineVec<AudioEvent, 6>;

/// The volume ramp loaded from NRx2 on trigger.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    volume: u8,
    increase: bool,
    /// Zero freezes the envelope.
    step: u32,
    elapsed: u32,
}

impl Envelope {
    pub const fn from_register(nrx2: u8) -> Self {
        Self {
            volume: nrx2 >> 4,
            increase: nrx2 & 0b1000 != 0,
            step: (nrx2 & 0b111) as u32 * ENVELOPE_STEP_CYCLES,
            elapsed: 0,
        }
    }

    pub const fn volume(&self) -> u8 {
        self.volume
    }

    pub const fn increasing(&self) -> bool {
        self.increase
    }

    /// Adds elapsed time and takes as many steps as fit. Returns the new volume if it moved.
    fn advance(&mut self, cycles: u32) -> Option<u8> {
        if self.step == 0 {
            return None;
        }
        self.elapsed += cycles;
        let start = self.volume;
        while self.elapsed >= self.step {
            self.elapsed -= self.step;
            self.volume = if self.increase {
                (self.volume + 1).min(MAX_VOLUME)
            } else {
                self.volume.saturating_sub(1)
            };
        }
        (self.volume != start).then_some(self.volume)
    }
}

#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    pub enabled: bool,
    pub period: u32,
    pub envelope: Envelope,
}

/// The Audio Processing Unit. It does not synthesize anything. It watches the channel registers
/// and reports what the oscillators should be doing.
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apu {
    channels: [ChannelState; 3],
}

impl Apu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, channel: Channel) -> &ChannelState {
        &self.channels[channel.index()]
    }

    /// Consumes pending triggers and advances the envelopes of the running channels.
    pub fn tick(&mut self, cycles: u8, audio: &mut AudioRegisters) -> AudioEvents {
        let mut events = AudioEvents::new();
        for channel in Channel::ALL {
            let regs = audio.channel_mut(channel);
            let state = &mut self.channels[channel.index()];
            if regs.triggered() {
                regs.control &= 0x7F;
                trigger(channel, state, regs, &mut events);
                continue;
            }
            if !state.enabled {
                continue;
            }
            match state.envelope.advance(cycles as u32) {
                Some(0) if !state.envelope.increasing() => {
                    state.enabled = false;
                    emit(&mut events, AudioEvent::Stop { channel });
                }
                Some(volume) => emit(&mut events, AudioEvent::Volume { channel, volume }),
                None => {}
            }
        }
        events
    }
}

fn trigger(
    channel: Channel,
    state: &mut ChannelState,
    regs: &ChannelRegisters,
    events: &mut AudioEvents,
) {
    if state.enabled {
        state.enabled = false;
        emit(events, AudioEvent::Stop { channel });
    }
    if regs.envelope & 0xF8 == 0 {
        debug!("{channel} triggered with its DAC off");
        return;
    }
    state.period = channel.period(regs);
    state.envelope = Envelope::from_register(regs.envelope);
    state.enabled = true;
    debug!(
        "{channel} triggered: period {}, volume {}",
        state.period,
        state.envelope.volume()
    );
    emit(
        events,
        AudioEvent::Trigger {
            channel,
            period: state.period,
            volume: state.envelope.volume(),
        },
    );
}

fn emit(events: &mut AudioEvents, event: AudioEvent) {
    if events.push(event).is_err() {
        warn!("Dropped audio event {event}");
    }
}
