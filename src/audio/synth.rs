use std::collections::HashMap;

use super::{NoteState, Patch, midi_to_freq, preset, voice::advance_envelope, voice::calculate_envelope};
use crate::events::{CounterEvent, Event, SetupEvent};

/// Polyphonic voice bank of the built-in synth. Setup events pick the patch,
/// counter events start and release voices.
pub struct Synth {
    pub volume: f32,
    patch: Patch,
    bank_msb: u8,
    bank_lsb: u8,
    program: u8,
    active_notes: HashMap<u8, NoteState>,
}

impl Synth {
    pub fn new() -> Self {
        Self {
            volume: 0.5,
            patch: preset::patch_for(0, 0),
            bank_msb: 0,
            bank_lsb: 0,
            program: 0,
            active_notes: HashMap::new(),
        }
    }

    pub fn bank(&self) -> u16 {
        ((self.bank_msb as u16) << 7) | self.bank_lsb as u16
    }

    pub fn program(&self) -> u8 {
        self.program
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn apply(&mut self, event: &Event, velocity: u8) {
        match event {
            Event::Setup(SetupEvent::BankSelectHigh(value)) => self.bank_msb = value & 0x7F,
            Event::Setup(SetupEvent::BankSelectLow(value)) => self.bank_lsb = value & 0x7F,
            Event::Setup(SetupEvent::PresetSelect(program)) => {
                self.program = program & 0x7F;
                self.patch = preset::patch_for(self.bank(), self.program);
            }
            Event::Counter(CounterEvent::PitchOn { pitch, .. }) => self.note_on(*pitch, velocity),
            Event::Counter(CounterEvent::PitchOff { pitch, .. }) => self.note_off(*pitch),
        }
    }

    pub fn note_on(&mut self, pitch: u8, velocity: u8) {
        let num_oscs = self.patch.num_oscillators();
        self.active_notes.insert(pitch, NoteState::new(velocity, num_oscs));
    }

    pub fn note_off(&mut self, pitch: u8) {
        if let Some(state) = self.active_notes.get_mut(&pitch) {
            state.release();
        }
    }

    pub fn is_silent(&self) -> bool {
        self.active_notes.is_empty()
    }

    pub fn render_sample(&mut self, sample_rate: f32) -> f32 {
        let mut output = 0.0;

        for (pitch, state) in &mut self.active_notes {
            let envelope = calculate_envelope(state, &self.patch.adsr);
            let velocity_scale = state.velocity as f32 / 127.0;

            for (i, osc) in self.patch.oscillators.iter().enumerate() {
                let Some(phase) = state.oscillator_phases.get_mut(i) else {
                    continue;
                };
                let note = (*pitch as i16 + osc.semitone as i16).clamp(0, 127) as u8;
                let freq = midi_to_freq(note);

                output += osc.wave.sample(*phase) * envelope * velocity_scale * osc.gain;

                *phase += freq / sample_rate;
                if *phase >= 1.0 {
                    *phase -= 1.0;
                }
            }

            advance_envelope(state, &self.patch.adsr, sample_rate, 1);
        }

        let adsr = &self.patch.adsr;
        self.active_notes.retain(|_, state| !state.is_finished(adsr));

        output * self.volume
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_events_select_patch() {
        let mut synth = Synth::new();
        synth.apply(&Event::Setup(SetupEvent::BankSelectHigh(1)), 50);
        synth.apply(&Event::Setup(SetupEvent::BankSelectLow(2)), 50);
        synth.apply(&Event::Setup(SetupEvent::PresetSelect(19)), 50);
        assert_eq!(synth.bank(), 130);
        assert_eq!(synth.program(), 19);
        assert_eq!(synth.patch(), &preset::patch_for(130, 19));
    }

    #[test]
    fn test_note_renders_then_releases() {
        let mut synth = Synth::new();
        synth.note_on(69, 100);
        let rendered: Vec<f32> = (0..4800).map(|_| synth.render_sample(48000.0)).collect();
        assert!(rendered.iter().any(|s| s.abs() > 0.01));
        assert!(rendered.iter().all(|s| s.is_finite()));

        synth.note_off(69);
        for _ in 0..48000 {
            synth.render_sample(48000.0);
        }
        assert!(synth.is_silent());
    }

    #[test]
    fn test_note_off_without_note_on() {
        let mut synth = Synth::new();
        synth.note_off(60);
        assert!(synth.is_silent());
        assert_eq!(synth.render_sample(48000.0), 0.0);
    }
}
