use std::time::Duration;

use crate::error::ConfigError;

/// Largest resolution a Standard MIDI File header can carry.
pub const MAX_TICKS_PER_QUARTER: u16 = 0x7FFF;

/// Converts timeline ticks to wall-clock time and to sample offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    seconds_per_tick: f64,
}

impl TickClock {
    /// `tempo_factor` scales `bpm`; 1.1 plays ten percent faster.
    pub fn new(ticks_per_quarter: u16, bpm: f32, tempo_factor: f32) -> Result<Self, ConfigError> {
        if ticks_per_quarter == 0 || ticks_per_quarter > MAX_TICKS_PER_QUARTER {
            return Err(ConfigError::InvalidTempo(format!(
                "ticks per quarter note {} is outside 1-{}",
                ticks_per_quarter, MAX_TICKS_PER_QUARTER
            )));
        }
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(ConfigError::InvalidTempo(format!("bpm {} is not positive", bpm)));
        }
        if !(tempo_factor.is_finite() && tempo_factor > 0.0) {
            return Err(ConfigError::InvalidTempo(format!(
                "tempo factor {} is not positive",
                tempo_factor
            )));
        }

        let quarters_per_second = bpm as f64 * tempo_factor as f64 / 60.0;
        Ok(Self {
            seconds_per_tick: 1.0 / (quarters_per_second * ticks_per_quarter as f64),
        })
    }

    pub fn seconds_per_tick(&self) -> f64 {
        self.seconds_per_tick
    }

    pub fn tick_to_duration(&self, tick: u64) -> Duration {
        Duration::from_secs_f64(tick as f64 * self.seconds_per_tick)
    }

    pub fn tick_to_sample(&self, tick: u64, sample_rate: f32) -> u64 {
        (tick as f64 * self.seconds_per_tick * sample_rate as f64).round() as u64
    }

    /// Effective tempo in microseconds per quarter note, as written to MIDI files.
    pub fn micros_per_quarter(&self, ticks_per_quarter: u16) -> u32 {
        (self.seconds_per_tick * ticks_per_quarter as f64 * 1_000_000.0).round() as u32
    }
}
