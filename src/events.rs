use serde::{Deserialize, Serialize};

/// MIDI controller numbers used by the setup events.
pub const CC_BANK_SELECT_MSB: u8 = 0;
pub const CC_BANK_SELECT_LSB: u8 = 32;
pub const CC_ALL_NOTES_OFF: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterEvent {
    PitchOn { bit: u8, pitch: u8, tick: u64 },
    PitchOff { bit: u8, pitch: u8, tick: u64 },
}

impl CounterEvent {
    pub fn tick(&self) -> u64 {
        match self {
            CounterEvent::PitchOn { tick, .. } | CounterEvent::PitchOff { tick, .. } => *tick,
        }
    }

    pub fn pitch(&self) -> u8 {
        match self {
            CounterEvent::PitchOn { pitch, .. } | CounterEvent::PitchOff { pitch, .. } => *pitch,
        }
    }

    pub fn bit(&self) -> u8 {
        match self {
            CounterEvent::PitchOn { bit, .. } | CounterEvent::PitchOff { bit, .. } => *bit,
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, CounterEvent::PitchOn { .. })
    }
}

/// Bank and program selection, always emitted at tick 0. Values are 7-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupEvent {
    BankSelectHigh(u8),
    BankSelectLow(u8),
    PresetSelect(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Setup(SetupEvent),
    Counter(CounterEvent),
}

impl Event {
    /// Raw channel message bytes for this event.
    pub fn midi_bytes(&self, channel: u8, velocity: u8) -> Vec<u8> {
        let channel = channel & 0x0F;
        match self {
            Event::Setup(SetupEvent::BankSelectHigh(value)) => {
                vec![0xB0 | channel, CC_BANK_SELECT_MSB, value & 0x7F]
            }
            Event::Setup(SetupEvent::BankSelectLow(value)) => {
                vec![0xB0 | channel, CC_BANK_SELECT_LSB, value & 0x7F]
            }
            Event::Setup(SetupEvent::PresetSelect(program)) => vec![0xC0 | channel, program & 0x7F],
            Event::Counter(CounterEvent::PitchOn { pitch, .. }) => {
                vec![0x90 | channel, pitch & 0x7F, velocity & 0x7F]
            }
            Event::Counter(CounterEvent::PitchOff { pitch, .. }) => {
                vec![0x80 | channel, pitch & 0x7F, velocity & 0x7F]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub tick: u64,
    pub event: Event,
}

/// Setup events followed by counter events, in playback order. Never mutated
/// once assembled, so it can be moved to a playback thread as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    events: Vec<ScheduledEvent>,
}

impl Timeline {
    pub(crate) fn from_events(events: Vec<ScheduledEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn end_tick(&self) -> u64 {
        self.events.last().map_or(0, |e| e.tick)
    }

    pub fn setup_events(&self) -> impl Iterator<Item = &SetupEvent> {
        self.events.iter().filter_map(|e| match &e.event {
            Event::Setup(setup) => Some(setup),
            Event::Counter(_) => None,
        })
    }

    pub fn counter_events(&self) -> impl Iterator<Item = &CounterEvent> {
        self.events.iter().filter_map(|e| match &e.event {
            Event::Counter(counter) => Some(counter),
            Event::Setup(_) => None,
        })
    }
}
