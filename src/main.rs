// midi_counter command-line entry point.
//
// Counts from 1 to 1023 and plays every bit that turns on as a note, either
// on a MIDI output port (default), on the built-in synth, or into a .mid file.
//
// Usage:
//   cargo run -- [-b BANK] [-i INSTRUMENT] [--synth | --port N | --export FILE.mid]
//     [--max-count N] [--tempo-factor F] [--velocity N]
//     [--config FILE.ron] [--save-config FILE.ron]
//   cargo run -- --list

use midi_counter::audio::{list_presets, preset::preset_name};
use midi_counter::{Backend, CounterSettings, list_midi_ports, spawn_player, write_smf};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
List all instruments and MIDI output ports:
  midi_counter --list
Specific instrument:
  midi_counter -b <bank> -i <instrument>
Options:
  --synth                 play on the built-in synth instead of a MIDI port
  --port <n>              MIDI output port index (default: first port)
  --export <file.mid>     write a Standard MIDI File instead of playing
  --max-count <n>         count up to n (default 1023)
  --tempo-factor <f>      playback speed multiplier (default 1.1)
  --velocity <n>          note velocity (default 50)
  --config <file.ron>     load settings
  --save-config <file.ron> write the effective settings
Default:
  midi_counter";

const VALUE_FLAGS: [&str; 11] = [
    "-b",
    "--bank",
    "-i",
    "--instrument",
    "--port",
    "--export",
    "--max-count",
    "--tempo-factor",
    "--config",
    "--save-config",
    "--velocity",
];
const SWITCHES: [&str; 3] = ["--help", "--list", "--synth"];

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    check_args(args)?;

    if has_flag(args, "--help") {
        println!("{}", USAGE);
        return Ok(());
    }
    if has_flag(args, "--list") {
        show_instruments();
        println!("{}", USAGE);
        return Ok(());
    }

    let mut settings = match parse_flag::<PathBuf>(args, &["--config"])? {
        Some(path) => {
            info!(path = %path.display(), "loading settings");
            CounterSettings::load(&path)?
        }
        None => CounterSettings::default(),
    };
    if let Some(bank) = parse_flag(args, &["-b", "--bank"])? {
        settings.bank = bank;
    }
    if let Some(instrument) = parse_flag(args, &["-i", "--instrument"])? {
        settings.preset = instrument;
    }
    if let Some(max_count) = parse_flag(args, &["--max-count"])? {
        settings.max_count = max_count;
    }
    if let Some(tempo_factor) = parse_flag(args, &["--tempo-factor"])? {
        settings.playback.tempo_factor = tempo_factor;
    }
    if let Some(velocity) = parse_flag(args, &["--velocity"])? {
        settings.playback.velocity = velocity;
    }
    settings.validate()?;

    if let Some(path) = parse_flag::<PathBuf>(args, &["--save-config"])? {
        settings.save(&path)?;
        info!(path = %path.display(), "saved settings");
    }

    let timeline = settings.build_timeline()?;
    info!(
        bank = settings.bank,
        instrument = settings.preset,
        name = preset_name(settings.preset as u8).unwrap_or("?"),
        max_count = settings.max_count,
        events = timeline.len(),
        "built timeline"
    );

    if let Some(path) = parse_flag::<PathBuf>(args, &["--export"])? {
        write_smf(&timeline, &settings.playback, &path)?;
        return Ok(());
    }

    let backend = if has_flag(args, "--synth") {
        Backend::Synth
    } else {
        Backend::MidiPort {
            port: parse_flag(args, &["--port"])?,
        }
    };

    let player = spawn_player(timeline, settings.playback.clone(), backend);
    player.wait()?;
    Ok(())
}

fn show_instruments() {
    let presets = list_presets();
    println!("The built-in synth has {} instruments.", presets.len());
    for preset in &presets {
        println!(
            "Instrument: {} bank #{} preset #{}",
            preset.name, preset.bank, preset.program
        );
    }
    println!();

    match list_midi_ports() {
        Ok(ports) if ports.is_empty() => println!("No MIDI output ports found."),
        Ok(ports) => {
            println!("MIDI output ports:");
            for (i, name) in ports.iter().enumerate() {
                println!("  {}: {}", i, name);
            }
        }
        Err(e) => warn!("could not list MIDI ports: {}", e),
    }
    println!();
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Rejects unknown flags and value flags missing their value.
fn check_args(args: &[String]) -> Result<(), String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            if iter.next().is_none() {
                return Err(format!("{} needs a value", arg));
            }
        } else if !SWITCHES.contains(&arg.as_str()) {
            return Err(format!("unknown argument '{}'", arg));
        }
    }
    Ok(())
}

/// Value following the first of `flags`. A value that does not parse is an
/// error, not a silent default.
fn parse_flag<T>(args: &[String], flags: &[&str]) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(i) = args.iter().position(|a| flags.contains(&a.as_str())) else {
        return Ok(None);
    };
    let value = args
        .get(i + 1)
        .ok_or_else(|| format!("{} needs a value", args[i]))?;
    value
        .parse()
        .map(Some)
        .map_err(|e| format!("invalid value '{}' for {}: {}", value, args[i], e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flag() {
        let a = args(&["-b", "130", "--instrument", "19"]);
        assert_eq!(parse_flag::<u32>(&a, &["-b", "--bank"]), Ok(Some(130)));
        assert_eq!(parse_flag::<u32>(&a, &["-i", "--instrument"]), Ok(Some(19)));
        assert_eq!(parse_flag::<u32>(&a, &["--port"]), Ok(None));
    }

    #[test]
    fn test_parse_flag_rejects_fractions_and_negatives() {
        assert!(parse_flag::<u32>(&args(&["-b", "3.7"]), &["-b"]).is_err());
        assert!(parse_flag::<u32>(&args(&["-i", "-1"]), &["-i"]).is_err());
        assert!(parse_flag::<u32>(&args(&["-i"]), &["-i"]).is_err());
    }

    #[test]
    fn test_check_args() {
        assert!(check_args(&args(&["--synth", "-b", "1"])).is_ok());
        assert!(check_args(&args(&["--bogus"])).is_err());
        assert!(check_args(&args(&["--export"])).is_err());
    }
}
