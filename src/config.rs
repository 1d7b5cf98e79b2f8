use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{
    error::{ConfigError, SettingsError},
    events::Timeline,
    timing::{self, PitchTable, TickClock},
};

pub const DEFAULT_TICKS_PER_QUARTER: u16 = 5;
pub const DEFAULT_BPM: f32 = 120.0;
pub const DEFAULT_TEMPO_FACTOR: f32 = 1.1;
pub const DEFAULT_CHANNEL: u8 = 1;
pub const DEFAULT_VELOCITY: u8 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackOptions {
    pub ticks_per_quarter: u16,
    pub bpm: f32,
    pub tempo_factor: f32,
    /// Zero-based MIDI channel.
    pub channel: u8,
    pub velocity: u8,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            ticks_per_quarter: DEFAULT_TICKS_PER_QUARTER,
            bpm: DEFAULT_BPM,
            tempo_factor: DEFAULT_TEMPO_FACTOR,
            channel: DEFAULT_CHANNEL,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

impl PlaybackOptions {
    pub fn clock(&self) -> Result<TickClock, ConfigError> {
        TickClock::new(self.ticks_per_quarter, self.bpm, self.tempo_factor)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel > 15 {
            return Err(ConfigError::ChannelOutOfRange(self.channel));
        }
        if self.velocity > 127 {
            return Err(ConfigError::VelocityOutOfRange(self.velocity));
        }
        self.clock().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSettings {
    pub max_count: u32,
    pub pitch_table: PitchTable,
    pub note_length_ticks: u32,
    pub start_tick: u64,
    pub bank: u32,
    pub preset: u32,
    pub playback: PlaybackOptions,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            max_count: timing::DEFAULT_MAX_COUNT,
            pitch_table: PitchTable::default(),
            note_length_ticks: timing::DEFAULT_NOTE_LENGTH_TICKS,
            start_tick: timing::DEFAULT_START_TICK,
            bank: 0,
            preset: 0,
            playback: PlaybackOptions::default(),
        }
    }
}

impl CounterSettings {
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;

        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let ron_string = fs::read_to_string(path)?;
        let settings: CounterSettings = ron::from_str(&ron_string)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Checks everything `build_timeline` and playback would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        timing::setup_events(self.bank, self.preset)?;
        timing::check_counter(
            self.max_count,
            &self.pitch_table,
            self.note_length_ticks,
            self.start_tick,
        )?;
        self.playback.validate()
    }

    pub fn build_timeline(&self) -> Result<Timeline, ConfigError> {
        // bank and preset fail before anything is encoded
        timing::setup_events(self.bank, self.preset)?;
        let counter_events = timing::encode(
            self.max_count,
            &self.pitch_table,
            self.note_length_ticks,
            self.start_tick,
        )?;
        timing::assemble(self.bank, self.preset, counter_events)
    }
}
