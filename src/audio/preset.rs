// Presets of the built-in synth.
//
// The synth has a single bank holding the 128 General MIDI programs. Programs
// are grouped by GM family (eight programs each) and every family shares one
// oscillator patch, so "Electric Grand Piano" and "Acoustic Grand Piano"
// sound alike. Other banks fall back to bank 0.

use super::{ADSRConfig, OscConfig, Patch, Wave};

pub const GM_PROGRAM_NAMES: [&str; 128] = [
    // Piano
    "Acoustic Grand Piano",
    "Bright Acoustic Piano",
    "Electric Grand Piano",
    "Honky-tonk Piano",
    "Electric Piano 1",
    "Electric Piano 2",
    "Harpsichord",
    "Clavinet",
    // Chromatic percussion
    "Celesta",
    "Glockenspiel",
    "Music Box",
    "Vibraphone",
    "Marimba",
    "Xylophone",
    "Tubular Bells",
    "Dulcimer",
    // Organ
    "Drawbar Organ",
    "Percussive Organ",
    "Rock Organ",
    "Church Organ",
    "Reed Organ",
    "Accordion",
    "Harmonica",
    "Tango Accordion",
    // Guitar
    "Acoustic Guitar (nylon)",
    "Acoustic Guitar (steel)",
    "Electric Guitar (jazz)",
    "Electric Guitar (clean)",
    "Electric Guitar (muted)",
    "Overdriven Guitar",
    "Distortion Guitar",
    "Guitar Harmonics",
    // Bass
    "Acoustic Bass",
    "Electric Bass (finger)",
    "Electric Bass (pick)",
    "Fretless Bass",
    "Slap Bass 1",
    "Slap Bass 2",
    "Synth Bass 1",
    "Synth Bass 2",
    // Strings
    "Violin",
    "Viola",
    "Cello",
    "Contrabass",
    "Tremolo Strings",
    "Pizzicato Strings",
    "Orchestral Harp",
    "Timpani",
    // Ensemble
    "String Ensemble 1",
    "String Ensemble 2",
    "Synth Strings 1",
    "Synth Strings 2",
    "Choir Aahs",
    "Voice Oohs",
    "Synth Voice",
    "Orchestra Hit",
    // Brass
    "Trumpet",
    "Trombone",
    "Tuba",
    "Muted Trumpet",
    "French Horn",
    "Brass Section",
    "Synth Brass 1",
    "Synth Brass 2",
    // Reed
    "Soprano Sax",
    "Alto Sax",
    "Tenor Sax",
    "Baritone Sax",
    "Oboe",
    "English Horn",
    "Bassoon",
    "Clarinet",
    // Pipe
    "Piccolo",
    "Flute",
    "Recorder",
    "Pan Flute",
    "Blown Bottle",
    "Shakuhachi",
    "Whistle",
    "Ocarina",
    // Synth lead
    "Lead 1 (square)",
    "Lead 2 (sawtooth)",
    "Lead 3 (calliope)",
    "Lead 4 (chiff)",
    "Lead 5 (charang)",
    "Lead 6 (voice)",
    "Lead 7 (fifths)",
    "Lead 8 (bass + lead)",
    // Synth pad
    "Pad 1 (new age)",
    "Pad 2 (warm)",
    "Pad 3 (polysynth)",
    "Pad 4 (choir)",
    "Pad 5 (bowed)",
    "Pad 6 (metallic)",
    "Pad 7 (halo)",
    "Pad 8 (sweep)",
    // Synth effects
    "FX 1 (rain)",
    "FX 2 (soundtrack)",
    "FX 3 (crystal)",
    "FX 4 (atmosphere)",
    "FX 5 (brightness)",
    "FX 6 (goblins)",
    "FX 7 (echoes)",
    "FX 8 (sci-fi)",
    // Ethnic
    "Sitar",
    "Banjo",
    "Shamisen",
    "Koto",
    "Kalimba",
    "Bagpipe",
    "Fiddle",
    "Shanai",
    // Percussive
    "Tinkle Bell",
    "Agogo",
    "Steel Drums",
    "Woodblock",
    "Taiko Drum",
    "Melodic Tom",
    "Synth Drum",
    "Reverse Cymbal",
    // Sound effects
    "Guitar Fret Noise",
    "Breath Noise",
    "Seashore",
    "Bird Tweet",
    "Telephone Ring",
    "Helicopter",
    "Applause",
    "Gunshot",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetInfo {
    pub bank: u16,
    pub program: u8,
    pub name: &'static str,
}

/// Every preset the built-in synth answers to.
pub fn list_presets() -> Vec<PresetInfo> {
    GM_PROGRAM_NAMES
        .iter()
        .enumerate()
        .map(|(program, name)| PresetInfo {
            bank: 0,
            program: program as u8,
            name,
        })
        .collect()
}

pub fn preset_name(program: u8) -> Option<&'static str> {
    GM_PROGRAM_NAMES.get(program as usize).copied()
}

fn osc(wave: Wave, gain: f32, semitone: i8) -> OscConfig {
    OscConfig {
        wave,
        gain,
        semitone,
    }
}

fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> ADSRConfig {
    ADSRConfig {
        attack,
        decay,
        sustain,
        release,
    }
}

/// Patch for `program`. The bank does not change the sound.
pub fn patch_for(_bank: u16, program: u8) -> Patch {
    match (program & 0x7F) / 8 {
        // piano, chromatic percussion: struck and decaying
        0 | 1 => Patch::new(
            vec![osc(Wave::Sine, 0.6, 0), osc(Wave::Triangle, 0.2, 12)],
            adsr(0.002, 0.4, 0.3, 0.3),
        ),
        // organ: held, no decay
        2 => Patch::new(
            vec![
                osc(Wave::Sine, 0.4, 0),
                osc(Wave::Sine, 0.25, 12),
                osc(Wave::Sine, 0.15, 19),
            ],
            adsr(0.01, 0.0, 1.0, 0.05),
        ),
        // guitar, bass: plucked
        3 | 4 => Patch::new(
            vec![osc(Wave::Saw, 0.35, 0), osc(Wave::Triangle, 0.3, -12)],
            adsr(0.003, 0.25, 0.2, 0.15),
        ),
        // strings, ensemble, pads: slow attack
        5 | 6 | 11 => Patch::new(
            vec![osc(Wave::Saw, 0.3, 0), osc(Wave::Saw, 0.2, 12)],
            adsr(0.08, 0.2, 0.8, 0.4),
        ),
        // brass, reed
        7 | 8 => Patch::new(
            vec![osc(Wave::Square, 0.25, 0), osc(Wave::Saw, 0.15, 0)],
            adsr(0.03, 0.1, 0.7, 0.1),
        ),
        // pipe
        9 => Patch::new(vec![osc(Wave::Sine, 0.7, 0)], adsr(0.04, 0.05, 0.9, 0.1)),
        // synth lead
        10 => Patch::new(
            vec![osc(Wave::Square, 0.3, 0), osc(Wave::Saw, 0.2, 7)],
            adsr(0.005, 0.1, 0.8, 0.05),
        ),
        _ => Patch::new(
            vec![osc(Wave::Triangle, 0.5, 0), osc(Wave::Square, 0.1, 24)],
            adsr(0.001, 0.15, 0.1, 0.2),
        ),
    }
}
