use crate::{
    audio,
    config::PlaybackOptions,
    error::PlaybackError,
    events::{Event, SetupEvent, Timeline},
    midi::MidiOut,
    timing::TickClock,
};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use ringbuf::{
    HeapCons, HeapRb,
    traits::{Consumer, Observer, Producer, Split},
};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// External synthesizer on a MIDI output port; `None` picks the first port.
    MidiPort { port: Option<usize> },
    /// Built-in oscillator synth on the default audio device.
    Synth,
}

#[derive(Debug, Clone)]
pub enum EngineCommand {
    Stop,
}

#[derive(Debug, Clone)]
pub enum PlaybackUpdate {
    Started { events: usize, duration: Duration },
    /// End of timeline reached, or playback interrupted by `Stop`.
    Finished { stopped: bool },
    Error(PlaybackError),
}

pub struct PlayerHandle {
    pub command_tx: Sender<EngineCommand>,
    pub update_rx: Receiver<PlaybackUpdate>,
}

impl PlayerHandle {
    pub fn stop(&self) {
        let _ = self.command_tx.send(EngineCommand::Stop);
    }

    /// Blocks until playback ends. `Ok(true)` when it was stopped early.
    pub fn wait(&self) -> Result<bool, PlaybackError> {
        loop {
            match self.update_rx.recv() {
                Ok(PlaybackUpdate::Started { events, duration }) => {
                    info!(events, seconds = duration.as_secs_f64(), "playback started");
                }
                Ok(PlaybackUpdate::Finished { stopped }) => return Ok(stopped),
                Ok(PlaybackUpdate::Error(e)) => return Err(e),
                Err(crossbeam::channel::RecvError) => return Err(PlaybackError::Disconnected),
            }
        }
    }
}

/// Plays `timeline` on its own thread and reports through the returned
/// handle. The timeline is moved in and only read from there on.
pub fn spawn_player(timeline: Timeline, options: PlaybackOptions, backend: Backend) -> PlayerHandle {
    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (update_tx, update_rx) = crossbeam::channel::unbounded();

    std::thread::spawn(move || {
        engine_thread(timeline, options, backend, command_rx, update_tx);
    });

    PlayerHandle {
        command_tx,
        update_rx,
    }
}

fn engine_thread(
    timeline: Timeline,
    options: PlaybackOptions,
    backend: Backend,
    command_rx: Receiver<EngineCommand>,
    update_tx: Sender<PlaybackUpdate>,
) {
    let result = options
        .clock()
        .map_err(PlaybackError::from)
        .and_then(|clock| match backend {
            Backend::MidiPort { port } => {
                play_midi(&timeline, &options, clock, port, &command_rx, &update_tx)
            }
            Backend::Synth => play_synth(&timeline, &options, clock, &command_rx, &update_tx),
        });

    match result {
        Ok(stopped) => {
            info!(stopped, "playback finished");
            let _ = update_tx.send(PlaybackUpdate::Finished { stopped });
        }
        Err(e) => {
            error!("playback failed: {}", e);
            let _ = update_tx.send(PlaybackUpdate::Error(e));
        }
    }
}

/// Sleeps until `due`. Returns true if a stop was requested meanwhile.
fn wait_until(due: Instant, command_rx: &Receiver<EngineCommand>) -> bool {
    loop {
        let now = Instant::now();
        if now >= due {
            return false;
        }
        match command_rx.recv_timeout(due - now) {
            Ok(EngineCommand::Stop) => return true,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return true,
        }
    }
}

fn play_midi(
    timeline: &Timeline,
    options: &PlaybackOptions,
    clock: TickClock,
    port: Option<usize>,
    command_rx: &Receiver<EngineCommand>,
    update_tx: &Sender<PlaybackUpdate>,
) -> Result<bool, PlaybackError> {
    let mut out = MidiOut::connect(port)?;

    let _ = update_tx.send(PlaybackUpdate::Started {
        events: timeline.len(),
        duration: clock.tick_to_duration(timeline.end_tick()),
    });

    let start = Instant::now();
    for scheduled in timeline.events() {
        if wait_until(start + clock.tick_to_duration(scheduled.tick), command_rx) {
            out.all_notes_off(options.channel)?;
            out.close();
            return Ok(true);
        }
        out.send(&scheduled.event.midi_bytes(options.channel, options.velocity))?;
    }

    out.close();
    Ok(false)
}

#[derive(Debug, Clone, Copy)]
struct SampledEvent {
    sample_timestamp: u64,
    event: Event,
}

struct AudioState {
    synth: audio::Synth,
    pending_event: Option<SampledEvent>,
    consumer: HeapCons<SampledEvent>,
    sample_rate: f32,
    num_channels: usize,
    velocity: u8,
    end_sample: u64,
    done_tx: Sender<()>,
    done: bool,
}

fn play_synth(
    timeline: &Timeline,
    options: &PlaybackOptions,
    clock: TickClock,
    command_rx: &Receiver<EngineCommand>,
    update_tx: &Sender<PlaybackUpdate>,
) -> Result<bool, PlaybackError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(PlaybackError::NoOutputDevice)?;
    let config = device
        .default_output_config()
        .map_err(|e| PlaybackError::Stream(e.to_string()))?;
    let stream_config: cpal::StreamConfig = config.into();

    let sample_rate = stream_config.sample_rate as f32;
    let num_channels = stream_config.channels as usize;
    info!("Audio output: {} channels, {} Hz", num_channels, sample_rate);

    let bank = timeline.setup_events().fold(0u16, |bank, setup| match setup {
        SetupEvent::BankSelectHigh(msb) => (bank & 0x7F) | ((*msb as u16) << 7),
        SetupEvent::BankSelectLow(lsb) => (bank & !0x7F) | *lsb as u16,
        SetupEvent::PresetSelect(_) => bank,
    });
    if bank != 0 {
        warn!(bank, "built-in synth only has bank 0, using it instead");
    }

    let ring_buffer = HeapRb::<SampledEvent>::new(timeline.len().max(1));
    let (mut producer, consumer) = ring_buffer.split();
    for scheduled in timeline.events() {
        let event = SampledEvent {
            sample_timestamp: clock.tick_to_sample(scheduled.tick, sample_rate),
            event: scheduled.event,
        };
        if producer.try_push(event).is_err() {
            return Err(PlaybackError::Stream("event buffer is full".into()));
        }
    }

    let (done_tx, done_rx) = crossbeam::channel::bounded(1);
    let (stream_err_tx, stream_err_rx) = crossbeam::channel::bounded::<PlaybackError>(1);
    let mut audio_state = AudioState {
        synth: audio::Synth::new(),
        pending_event: None,
        consumer,
        sample_rate,
        num_channels: num_channels.max(1),
        velocity: options.velocity,
        end_sample: clock.tick_to_sample(timeline.end_tick(), sample_rate),
        done_tx,
        done: false,
    };

    let sample_counter = Arc::new(AtomicU64::new(0));
    let counter_audio = sample_counter.clone();

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                audio_callback(data, &mut audio_state, &counter_audio);
            },
            move |err| {
                if let Some(failure) = stream_failure(err) {
                    let _ = stream_err_tx.try_send(failure);
                }
            },
            None,
        )
        .map_err(|e| PlaybackError::Stream(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PlaybackError::Stream(e.to_string()))?;

    let _ = update_tx.send(PlaybackUpdate::Started {
        events: timeline.len(),
        duration: clock.tick_to_duration(timeline.end_tick()),
    });

    let stopped = loop {
        let finished = crossbeam::select! {
            recv(done_rx) -> msg => msg.map(|()| true).map_err(|_| PlaybackError::Disconnected),
            recv(stream_err_rx) -> msg => Err(msg.unwrap_or(PlaybackError::Disconnected)),
            default(POLL_INTERVAL) => Ok(false),
        };
        if finished? {
            break false;
        }
        match command_rx.try_recv() {
            Ok(EngineCommand::Stop) | Err(TryRecvError::Disconnected) => break true,
            Err(TryRecvError::Empty) => {}
        }
    };

    info!(
        samples = sample_counter.load(Ordering::Relaxed),
        "audio stream closed"
    );
    drop(stream);
    Ok(stopped)
}

/// Underruns only glitch the output. Anything else ends the stream.
fn stream_failure(err: cpal::StreamError) -> Option<PlaybackError> {
    match err {
        cpal::StreamError::BufferUnderrun => {
            warn!("audio buffer underrun");
            None
        }
        other => {
            error!("Audio error: {}", other);
            Some(PlaybackError::Stream(other.to_string()))
        }
    }
}

fn audio_callback(data: &mut [f32], state: &mut AudioState, sample_counter: &Arc<AtomicU64>) {
    let num_frames = data.len() / state.num_channels;
    let current_sample = sample_counter.load(Ordering::Relaxed);
    let buffer_end = current_sample + num_frames as u64;

    let mut events: Vec<SampledEvent> = Vec::with_capacity(64);
    if let Some(ev) = state.pending_event.take() {
        if ev.sample_timestamp < buffer_end {
            events.push(ev);
        } else {
            state.pending_event = Some(ev);
        }
    }

    while state.pending_event.is_none() {
        match state.consumer.try_pop() {
            Some(ev) if ev.sample_timestamp < buffer_end => events.push(ev),
            Some(ev) => {
                state.pending_event = Some(ev);
                break;
            }
            None => break,
        }
    }

    data.fill(0.0);

    let mut event_idx = 0;
    for frame in 0..num_frames {
        while event_idx < events.len() {
            let event_frame = events[event_idx]
                .sample_timestamp
                .saturating_sub(current_sample) as usize;
            if event_frame > frame {
                break;
            }
            state.synth.apply(&events[event_idx].event, state.velocity);
            event_idx += 1;
        }

        let sample = state.synth.render_sample(state.sample_rate);
        for out in &mut data[frame * state.num_channels..(frame + 1) * state.num_channels] {
            *out = sample;
        }
    }

    sample_counter.fetch_add(num_frames as u64, Ordering::Relaxed);

    let drained = state.pending_event.is_none() && state.consumer.is_empty();
    if !state.done && drained && buffer_end >= state.end_sample && state.synth.is_silent() {
        state.done = true;
        let _ = state.done_tx.try_send(());
    }
}
