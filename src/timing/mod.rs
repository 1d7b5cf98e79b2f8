mod assembler;
mod clock;
mod encoder;
mod pitch_table;

pub use assembler::{MAX_BANK, MAX_PRESET, assemble, setup_events};
pub use clock::{MAX_TICKS_PER_QUARTER, TickClock};
pub use encoder::{
    DEFAULT_MAX_COUNT, DEFAULT_NOTE_LENGTH_TICKS, DEFAULT_START_TICK, bit_width, check_counter,
    encode, rising_edges,
};
pub use pitch_table::{COUNTER_BITS, DEFAULT_PITCHES, PitchTable};
