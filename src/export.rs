// Standard MIDI File output.
//
// Writes a timeline as a single-track SMF (format 0). Timeline ticks are
// written unchanged at `ticks_per_quarter` resolution, and the tempo meta
// event carries `bpm * tempo_factor` so a file player keeps the same pace as
// live playback.

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;
use tracing::info;

use crate::config::PlaybackOptions;
use crate::error::ExportError;
use crate::events::{
    CC_BANK_SELECT_LSB, CC_BANK_SELECT_MSB, CounterEvent, Event, SetupEvent, Timeline,
};

const MAX_DELTA: u64 = 0x0FFF_FFFF;
const MAX_TEMPO: u32 = 0x00FF_FFFF;

pub fn write_smf(
    timeline: &Timeline,
    options: &PlaybackOptions,
    path: &Path,
) -> Result<(), ExportError> {
    let bytes = smf_bytes(timeline, options)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote MIDI file");
    Ok(())
}

pub fn smf_bytes(timeline: &Timeline, options: &PlaybackOptions) -> Result<Vec<u8>, ExportError> {
    let smf = timeline_to_smf(timeline, options)?;
    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(buf)
}

fn channel_message(event: &Event, velocity: u7) -> MidiMessage {
    match event {
        Event::Setup(SetupEvent::BankSelectHigh(value)) => MidiMessage::Controller {
            controller: u7::new(CC_BANK_SELECT_MSB),
            value: u7::new(value & 0x7F),
        },
        Event::Setup(SetupEvent::BankSelectLow(value)) => MidiMessage::Controller {
            controller: u7::new(CC_BANK_SELECT_LSB),
            value: u7::new(value & 0x7F),
        },
        Event::Setup(SetupEvent::PresetSelect(program)) => MidiMessage::ProgramChange {
            program: u7::new(program & 0x7F),
        },
        Event::Counter(CounterEvent::PitchOn { pitch, .. }) => MidiMessage::NoteOn {
            key: u7::new(pitch & 0x7F),
            vel: velocity,
        },
        Event::Counter(CounterEvent::PitchOff { pitch, .. }) => MidiMessage::NoteOff {
            key: u7::new(pitch & 0x7F),
            vel: velocity,
        },
    }
}

fn timeline_to_smf(
    timeline: &Timeline,
    options: &PlaybackOptions,
) -> Result<Smf<'static>, ExportError> {
    let clock = options.clock()?;
    let tempo = clock.micros_per_quarter(options.ticks_per_quarter).min(MAX_TEMPO);

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(options.ticks_per_quarter)),
    ));

    let channel = u4::new(options.channel & 0x0F);
    let velocity = u7::new(options.velocity & 0x7F);

    let mut track: Track<'static> = Vec::with_capacity(timeline.len() + 3);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(b"midi_counter")),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo))),
    });

    let mut last_tick = 0;
    for scheduled in timeline.events() {
        let delta = scheduled.tick.saturating_sub(last_tick);
        if delta > MAX_DELTA {
            return Err(ExportError::DeltaTooLarge(delta));
        }
        track.push(TrackEvent {
            delta: u28::new(delta as u32),
            kind: TrackEventKind::Midi {
                channel,
                message: channel_message(&scheduled.event, velocity),
            },
        });
        last_tick = last_tick.max(scheduled.tick);
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    Ok(smf)
}
