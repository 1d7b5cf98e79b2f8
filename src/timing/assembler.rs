use crate::error::ConfigError;
use crate::events::{CounterEvent, Event, ScheduledEvent, SetupEvent, Timeline};

/// Largest bank number that fits the two 7-bit bank select controllers.
pub const MAX_BANK: u32 = 0x3FFF;
pub const MAX_PRESET: u32 = 0x7F;

/// Bank MSB, bank LSB and program change for the given selection.
pub fn setup_events(bank_number: u32, preset_number: u32) -> Result<[SetupEvent; 3], ConfigError> {
    if bank_number > MAX_BANK {
        return Err(ConfigError::BankOutOfRange(bank_number));
    }
    if preset_number > MAX_PRESET {
        return Err(ConfigError::PresetOutOfRange(preset_number));
    }

    Ok([
        SetupEvent::BankSelectHigh((bank_number >> 7) as u8),
        SetupEvent::BankSelectLow((bank_number & 0x7F) as u8),
        SetupEvent::PresetSelect(preset_number as u8),
    ])
}

/// Prepends the bank and preset selection at tick 0 to the counter events.
/// Counter events keep their order and payload.
pub fn assemble(
    bank_number: u32,
    preset_number: u32,
    counter_events: Vec<CounterEvent>,
) -> Result<Timeline, ConfigError> {
    let setup = setup_events(bank_number, preset_number)?;

    let mut events: Vec<ScheduledEvent> = Vec::with_capacity(setup.len() + counter_events.len());
    events.extend(setup.into_iter().map(|setup| ScheduledEvent {
        tick: 0,
        event: Event::Setup(setup),
    }));
    events.extend(counter_events.into_iter().map(|counter| ScheduledEvent {
        tick: counter.tick(),
        event: Event::Counter(counter),
    }));

    Ok(Timeline::from_events(events))
}
