//! MIDI output using midir
use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, info};

use crate::error::PlaybackError;
use crate::events::CC_ALL_NOTES_OFF;

const CLIENT_NAME: &str = "midi_counter";

pub fn list_midi_ports() -> Result<Vec<String>, PlaybackError> {
    let midi_out =
        MidiOutput::new(CLIENT_NAME).map_err(|e| PlaybackError::MidiInit(e.to_string()))?;

    Ok(midi_out
        .ports()
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect())
}

pub struct MidiOut {
    connection: MidiOutputConnection,
}

impl MidiOut {
    /// Connects to output port `port_index`, or the first port when `None`.
    pub fn connect(port_index: Option<usize>) -> Result<Self, PlaybackError> {
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|e| PlaybackError::MidiInit(e.to_string()))?;

        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(PlaybackError::NoMidiPorts);
        }
        let index = port_index.unwrap_or(0);
        let port = ports.get(index).ok_or(PlaybackError::InvalidPort {
            index,
            available: ports.len(),
        })?;
        let port_name = midi_out
            .port_name(port)
            .unwrap_or_else(|_| format!("port {}", index));

        let connection = midi_out
            .connect(port, "midi_counter-out")
            .map_err(|e| PlaybackError::MidiConnect(e.to_string()))?;

        info!(port = %port_name, "connected to MIDI output");
        Ok(Self { connection })
    }

    pub fn send(&mut self, message: &[u8]) -> Result<(), PlaybackError> {
        debug!(?message, "midi out");
        self.connection
            .send(message)
            .map_err(|e| PlaybackError::MidiSend(e.to_string()))
    }

    pub fn all_notes_off(&mut self, channel: u8) -> Result<(), PlaybackError> {
        self.send(&[0xB0 | (channel & 0x0F), CC_ALL_NOTES_OFF, 0])
    }

    pub fn close(self) {
        self.connection.close();
    }
}
