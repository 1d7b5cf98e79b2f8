use serde::{Deserialize, Serialize};

use super::ADSRConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Wave {
    Sine,
    Square,
    Saw,
    Triangle,
}

impl Wave {
    /// One sample at `phase` in [0, 1).
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Wave::Sine => (phase * 2.0 * std::f32::consts::PI).sin(),
            Wave::Square => {
                if phase < 0.5 {
                    -1.0
                } else {
                    1.0
                }
            }
            Wave::Saw => phase * 2.0 - 1.0,
            Wave::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscConfig {
    pub wave: Wave,
    pub gain: f32,
    pub semitone: i8,
}

/// Oscillator stack and envelope the built-in synth plays a preset with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub oscillators: Vec<OscConfig>,
    pub adsr: ADSRConfig,
}

impl Patch {
    pub fn new(oscillators: Vec<OscConfig>, adsr: ADSRConfig) -> Self {
        Self { oscillators, adsr }
    }

    pub fn num_oscillators(&self) -> usize {
        self.oscillators.len()
    }
}
