//! Properties of the counter timeline, checked through the public API.

use midi_counter::timing::{DEFAULT_PITCHES, bit_width};
use midi_counter::{
    ConfigError, CounterEvent, CounterSettings, Event, PitchTable, SettingsError, SetupEvent,
    assemble, encode,
};

fn pairs(events: &[CounterEvent]) -> Vec<(CounterEvent, CounterEvent)> {
    events.chunks(2).map(|c| (c[0], c[1])).collect()
}

/// Full ranges 1..=2^W-1 rise exactly once per step.
#[test]
fn test_event_count_for_full_ranges() {
    let table = PitchTable::default();
    for width in 1..=10u32 {
        let max_count = (1u32 << width) - 1;
        let events = encode(max_count, &table, 2, 1).unwrap();
        assert_eq!(events.len(), 2 * max_count as usize, "width {}", width);
    }
}

#[test]
fn test_pairs_are_back_to_back() {
    let note_length = 3;
    let events = encode(1023, &PitchTable::default(), note_length, 1).unwrap();
    let pairs = pairs(&events);

    for (on, off) in &pairs {
        assert!(on.is_on());
        assert!(!off.is_on());
        assert_eq!(on.pitch(), off.pitch());
        assert_eq!(on.bit(), off.bit());
        assert_eq!(off.tick(), on.tick() + note_length as u64);
    }
    for window in pairs.windows(2) {
        assert_eq!(window[1].0.tick(), window[0].1.tick());
    }
}

#[test]
fn test_bit_maps_to_reversed_table_entry() {
    let table = PitchTable::default();
    let events = encode(1023, &table, 2, 1).unwrap();
    for event in &events {
        let index = DEFAULT_PITCHES.len() - 1 - event.bit() as usize;
        assert_eq!(event.pitch(), DEFAULT_PITCHES[index]);
    }
    // the top bit rises once, at 512
    let top: Vec<&CounterEvent> = events.iter().filter(|e| e.bit() == 9).collect();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].pitch(), 62);
}

#[test]
fn test_encode_is_deterministic() {
    let table = PitchTable::default();
    let first = encode(1023, &table, 2, 1).unwrap();
    let second = encode(1023, &table, 2, 1).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_concrete_count_to_three() {
    let events = encode(3, &PitchTable::default(), 2, 1).unwrap();
    let expected = vec![
        CounterEvent::PitchOn { bit: 0, pitch: 74, tick: 1 },
        CounterEvent::PitchOff { bit: 0, pitch: 74, tick: 3 },
        CounterEvent::PitchOn { bit: 1, pitch: 76, tick: 3 },
        CounterEvent::PitchOff { bit: 1, pitch: 76, tick: 5 },
        CounterEvent::PitchOn { bit: 0, pitch: 74, tick: 5 },
        CounterEvent::PitchOff { bit: 0, pitch: 74, tick: 7 },
    ];
    assert_eq!(events, expected);
}

#[test]
fn test_nine_entry_table_cannot_count_to_1023() {
    let table = PitchTable::new(DEFAULT_PITCHES[..9].to_vec()).unwrap();
    assert_eq!(bit_width(1023), 10);
    assert!(matches!(
        encode(1023, &table, 2, 1),
        Err(ConfigError::PitchTableTooShort { len: 9, required: 10, .. })
    ));
    // 511 fits in nine bits
    assert!(encode(511, &table, 2, 1).is_ok());
}

#[test]
fn test_assemble_prepends_setup() {
    let counter = encode(100, &PitchTable::default(), 2, 1).unwrap();
    let count = counter.len();
    let timeline = assemble(130, 42, counter).unwrap();

    assert_eq!(timeline.len(), 3 + count);
    let setup: Vec<SetupEvent> = timeline.setup_events().copied().collect();
    assert_eq!(
        setup,
        vec![
            SetupEvent::BankSelectHigh(1),
            SetupEvent::BankSelectLow(2),
            SetupEvent::PresetSelect(42),
        ]
    );

    let events = timeline.events();
    assert!(events[..3].iter().all(|e| e.tick == 0 && matches!(e.event, Event::Setup(_))));
    assert!(events[3..].iter().all(|e| matches!(e.event, Event::Counter(_))));
    assert!(events.windows(2).all(|w| w[0].tick <= w[1].tick));
}

#[test]
fn test_assemble_fails_fast() {
    assert_eq!(
        assemble(20000, 0, Vec::new()),
        Err(ConfigError::BankOutOfRange(20000))
    );
    assert_eq!(
        assemble(0, 200, Vec::new()),
        Err(ConfigError::PresetOutOfRange(200))
    );
}

#[test]
fn test_settings_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.ron");

    let mut settings = CounterSettings::default();
    settings.bank = 130;
    settings.preset = 19;
    settings.max_count = 255;
    settings.playback.tempo_factor = 1.5;
    settings.save(&path).unwrap();

    let loaded = CounterSettings::load(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.build_timeline().unwrap().len(), 3 + 2 * 255);
}

#[test]
fn test_load_rejects_invalid_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ron");
    std::fs::write(&path, "(preset: 128)").unwrap();

    match CounterSettings::load(&path) {
        Err(SettingsError::Invalid(ConfigError::PresetOutOfRange(128))) => {}
        other => panic!("expected a preset error, got {:?}", other),
    }
}

#[test]
fn test_export_parses_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.mid");

    let settings = CounterSettings::default();
    let timeline = settings.build_timeline().unwrap();
    midi_counter::write_smf(&timeline, &settings.playback, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let smf = midly::Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 1);
    // name + tempo + timeline + end of track
    assert_eq!(smf.tracks[0].len(), timeline.len() + 3);
}
