use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Width of the counter. Counting to 1023 takes 10 bits.
pub const COUNTER_BITS: usize = 10;

/// D E F G A, then A G F E D an octave up. Bit 0 sounds the last entry.
pub const DEFAULT_PITCHES: [u8; COUNTER_BITS] = [62, 64, 65, 67, 69, 81, 79, 77, 76, 74];

/// One MIDI pitch per counter bit, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct PitchTable {
    pitches: Vec<u8>,
}

impl PitchTable {
    pub fn new(pitches: Vec<u8>) -> Result<Self, ConfigError> {
        if pitches.is_empty() {
            return Err(ConfigError::EmptyPitchTable);
        }
        if pitches.len() > COUNTER_BITS {
            return Err(ConfigError::PitchTableTooLong {
                len: pitches.len(),
                max: COUNTER_BITS,
            });
        }
        if let Some((index, &pitch)) = pitches.iter().enumerate().find(|(_, p)| **p > 127) {
            return Err(ConfigError::PitchOutOfRange { index, pitch });
        }
        Ok(Self { pitches })
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }

    /// Pitch sounded by counter bit `bit`. The mapping runs backwards through
    /// the table: bit 0 is the last entry.
    pub fn pitch_for_bit(&self, bit: usize) -> Option<u8> {
        let index = self.pitches.len().checked_sub(bit + 1)?;
        self.pitches.get(index).copied()
    }
}

impl Default for PitchTable {
    fn default() -> Self {
        Self {
            pitches: DEFAULT_PITCHES.to_vec(),
        }
    }
}

impl TryFrom<Vec<u8>> for PitchTable {
    type Error = ConfigError;

    fn try_from(pitches: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(pitches)
    }
}

impl From<PitchTable> for Vec<u8> {
    fn from(table: PitchTable) -> Self {
        table.pitches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_bit_mapping() {
        let table = PitchTable::default();
        assert_eq!(table.pitch_for_bit(0), Some(74));
        assert_eq!(table.pitch_for_bit(1), Some(76));
        assert_eq!(table.pitch_for_bit(9), Some(62));
        assert_eq!(table.pitch_for_bit(10), None);
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert_eq!(PitchTable::new(vec![]), Err(ConfigError::EmptyPitchTable));
        assert_eq!(
            PitchTable::new(vec![60; 11]),
            Err(ConfigError::PitchTableTooLong { len: 11, max: 10 })
        );
        assert_eq!(
            PitchTable::new(vec![60, 200]),
            Err(ConfigError::PitchOutOfRange {
                index: 1,
                pitch: 200
            })
        );
    }
}
