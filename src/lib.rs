//! Plays a binary counter as music.
//!
//! Counting from 1 to 1023, every bit that turns on sounds one note from a
//! ten-entry pitch table. `timing::encode` turns the count into note events,
//! `timing::assemble` puts the bank and program selection in front of them,
//! and the resulting [`Timeline`] is either played by the engine (MIDI port
//! or built-in synth) or written out as a Standard MIDI File.

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod export;
pub mod midi;
pub mod timing;

pub use config::{CounterSettings, PlaybackOptions};
pub use engine::{Backend, EngineCommand, PlaybackUpdate, PlayerHandle, spawn_player};
pub use error::{ConfigError, ExportError, PlaybackError, SettingsError};
pub use events::{CounterEvent, Event, ScheduledEvent, SetupEvent, Timeline};
pub use export::write_smf;
pub use midi::list_midi_ports;
pub use timing::{PitchTable, assemble, encode};
