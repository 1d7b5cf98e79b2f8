use tracing::debug;

use super::PitchTable;
use crate::error::ConfigError;
use crate::events::CounterEvent;

pub const DEFAULT_MAX_COUNT: u32 = 1023;
pub const DEFAULT_NOTE_LENGTH_TICKS: u32 = 2;
pub const DEFAULT_START_TICK: u64 = 1;

/// Number of bits needed to hold `max_count`.
pub fn bit_width(max_count: u32) -> usize {
    (u32::BITS - max_count.leading_zeros()) as usize
}

/// Bits that are set in `current` and clear in `previous`, lowest first.
pub fn rising_edges(previous: u32, current: u32, width: usize) -> impl Iterator<Item = usize> {
    let rising = current & !previous;
    (0..width).filter(move |&bit| (rising >> bit) & 1 == 1)
}

/// Checks that `encode` can count to `max_count` with these parameters and
/// returns the tick of the last note-off.
pub fn check_counter(
    max_count: u32,
    pitch_table: &PitchTable,
    note_length_ticks: u32,
    start_tick: u64,
) -> Result<u64, ConfigError> {
    if max_count == 0 {
        return Err(ConfigError::ZeroMaxCount);
    }
    if note_length_ticks == 0 {
        return Err(ConfigError::ZeroNoteLength);
    }

    let width = bit_width(max_count);
    if pitch_table.len() < width {
        return Err(ConfigError::PitchTableTooShort {
            len: pitch_table.len(),
            required: width,
            max_count,
        });
    }

    // one rising edge per step
    (max_count as u64)
        .checked_mul(note_length_ticks as u64)
        .and_then(|span| span.checked_add(start_tick))
        .ok_or(ConfigError::TickOverflow {
            max_count,
            start_tick,
        })
}

/// Walks the counter from 1 to `max_count` and emits a note for every bit
/// that turns on. Notes never overlap: when several bits rise on the same
/// step they are played one after another, lowest bit first, each one
/// `note_length_ticks` long.
pub fn encode(
    max_count: u32,
    pitch_table: &PitchTable,
    note_length_ticks: u32,
    start_tick: u64,
) -> Result<Vec<CounterEvent>, ConfigError> {
    let end_tick = check_counter(max_count, pitch_table, note_length_ticks, start_tick)?;
    let width = bit_width(max_count);

    let note_length = note_length_ticks as u64;
    // Adding one sets exactly one bit, so every step yields one note.
    let mut events = Vec::with_capacity(max_count as usize * 2);
    let mut note_index: u64 = 0;

    for current in 1..=max_count {
        for bit in rising_edges(current - 1, current, width) {
            let pitch = pitch_table
                .pitch_for_bit(bit)
                .ok_or(ConfigError::PitchTableTooShort {
                    len: pitch_table.len(),
                    required: width,
                    max_count,
                })?;
            let bit = bit as u8;

            events.push(CounterEvent::PitchOn {
                bit,
                pitch,
                tick: start_tick + note_index * note_length,
            });
            events.push(CounterEvent::PitchOff {
                bit,
                pitch,
                tick: start_tick + (note_index + 1) * note_length,
            });

            note_index += 1;
        }
    }

    debug!(
        max_count,
        end_tick,
        rising_edges = note_index,
        events = events.len(),
        "encoded counter"
    );

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(pitch: u8, tick: u64) -> (bool, u8, u64) {
        (true, pitch, tick)
    }

    fn off(pitch: u8, tick: u64) -> (bool, u8, u64) {
        (false, pitch, tick)
    }

    fn flatten(events: &[CounterEvent]) -> Vec<(bool, u8, u64)> {
        events
            .iter()
            .map(|e| (e.is_on(), e.pitch(), e.tick()))
            .collect()
    }

    #[test]
    fn test_bit_width() {
        assert_eq!(bit_width(1), 1);
        assert_eq!(bit_width(3), 2);
        assert_eq!(bit_width(4), 3);
        assert_eq!(bit_width(1023), 10);
        assert_eq!(bit_width(1024), 11);
    }

    #[test]
    fn test_rising_edges() {
        assert_eq!(rising_edges(0, 1, 10).collect::<Vec<_>>(), vec![0]);
        assert_eq!(rising_edges(1, 2, 10).collect::<Vec<_>>(), vec![1]);
        assert_eq!(rising_edges(3, 4, 10).collect::<Vec<_>>(), vec![2]);
        assert_eq!(rising_edges(4, 7, 10).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(rising_edges(7, 6, 10).count(), 0);
    }

    #[test]
    fn test_count_to_three() {
        let events = encode(3, &PitchTable::default(), 2, 1).unwrap();
        assert_eq!(
            flatten(&events),
            vec![
                on(74, 1),
                off(74, 3),
                on(76, 3),
                off(76, 5),
                on(74, 5),
                off(74, 7),
            ]
        );
    }

    #[test]
    fn test_count_to_one() {
        let table = PitchTable::default();
        let events = encode(1, &table, 2, 1).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].bit(), 0);
        assert_eq!(events[0].pitch(), table.pitches()[table.len() - 1]);
    }

    #[test]
    fn test_zero_max_count() {
        assert_eq!(
            encode(0, &PitchTable::default(), 2, 1),
            Err(ConfigError::ZeroMaxCount)
        );
    }

    #[test]
    fn test_zero_note_length() {
        assert_eq!(
            encode(10, &PitchTable::default(), 0, 1),
            Err(ConfigError::ZeroNoteLength)
        );
    }

    #[test]
    fn test_table_too_short() {
        let table = PitchTable::new(DEFAULT_PITCHES_SHORT.to_vec()).unwrap();
        assert_eq!(
            encode(1023, &table, 2, 1),
            Err(ConfigError::PitchTableTooShort {
                len: 9,
                required: 10,
                max_count: 1023
            })
        );
    }

    #[test]
    fn test_short_table_for_small_counter() {
        let table = PitchTable::new(vec![60, 72]).unwrap();
        let events = encode(3, &table, 1, 0).unwrap();
        assert_eq!(
            flatten(&events),
            vec![on(72, 0), off(72, 1), on(60, 1), off(60, 2), on(72, 2), off(72, 3)]
        );
    }

    #[test]
    fn test_no_two_notes_share_a_tick() {
        let events = encode(7, &PitchTable::default(), 2, 1).unwrap();
        let ticks: Vec<u64> = events.iter().filter(|e| e.is_on()).map(|e| e.tick()).collect();
        assert_eq!(ticks, vec![1, 3, 5, 7, 9, 11, 13]);
        // 3 -> 4 clears two bits and raises only bit 2
        assert_eq!(events[6].bit(), 2);
        assert_eq!(events[6].pitch(), 77);
    }

    #[test]
    fn test_tick_overflow() {
        let table = PitchTable::default();
        assert_eq!(
            encode(3, &table, 2, u64::MAX),
            Err(ConfigError::TickOverflow {
                max_count: 3,
                start_tick: u64::MAX
            })
        );
        // last note-off lands exactly on u64::MAX
        let events = encode(3, &table, 2, u64::MAX - 6).unwrap();
        assert_eq!(events.last().map(|e| e.tick()), Some(u64::MAX));
        assert!(events.chunks(2).all(|pair| pair[0].tick() < pair[1].tick()));
    }

    #[test]
    fn test_check_counter_end_tick() {
        let table = PitchTable::default();
        assert_eq!(check_counter(3, &table, 2, 1), Ok(7));
        assert_eq!(check_counter(1023, &table, 2, 1), Ok(2047));
        assert_eq!(check_counter(0, &table, 2, 1), Err(ConfigError::ZeroMaxCount));
    }

    const DEFAULT_PITCHES_SHORT: [u8; 9] = [62, 64, 65, 67, 69, 81, 79, 77, 76];
}
