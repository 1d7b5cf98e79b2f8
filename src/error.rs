use thiserror::Error;

/// Invalid counter, pitch table or preset configuration. Raised before any
/// event is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max count must be at least 1")]
    ZeroMaxCount,

    #[error("note length must be at least 1 tick")]
    ZeroNoteLength,

    #[error("pitch table is empty")]
    EmptyPitchTable,

    #[error("pitch table has {len} entries, at most {max} are supported")]
    PitchTableTooLong { len: usize, max: usize },

    #[error("pitch table has {len} entries, counting to {max_count} needs {required}")]
    PitchTableTooShort {
        len: usize,
        required: usize,
        max_count: u32,
    },

    #[error("counting to {max_count} from tick {start_tick} overflows the tick range")]
    TickOverflow { max_count: u32, start_tick: u64 },

    #[error("pitch {pitch} at index {index} is outside 0-127")]
    PitchOutOfRange { index: usize, pitch: u8 },

    #[error("bank {0} is outside 0-16383")]
    BankOutOfRange(u32),

    #[error("preset {0} is outside 0-127")]
    PresetOutOfRange(u32),

    #[error("MIDI channel {0} is outside 0-15")]
    ChannelOutOfRange(u8),

    #[error("velocity {0} is outside 0-127")]
    VelocityOutOfRange(u8),

    #[error("invalid tempo: {0}")]
    InvalidTempo(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Invalid settings: {0}")]
    Invalid(#[from] ConfigError),
}

#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Invalid playback settings: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create MIDI output: {0}")]
    MidiInit(String),

    #[error("No MIDI output ports available")]
    NoMidiPorts,

    #[error("Invalid MIDI port index {index} ({available} available)")]
    InvalidPort { index: usize, available: usize },

    #[error("Failed to connect to MIDI port: {0}")]
    MidiConnect(String),

    #[error("Failed to send MIDI message: {0}")]
    MidiSend(String),

    #[error("No audio output device")]
    NoOutputDevice,

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Playback engine stopped unexpectedly")]
    Disconnected,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid playback settings: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode MIDI file: {0}")]
    Encode(String),

    #[error("Gap of {0} ticks does not fit a MIDI delta time")]
    DeltaTooLarge(u64),
}
