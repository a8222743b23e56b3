//! Headless runner: loads a ROM, runs it for a number of cycles and prints the
//! final display as text.
//!
//! Usage: chip8vm <rom> [cycles] [config.toml]
//!
//! The config file may hold an `[emulator]` table (see `chip8vm::Config`) and a
//! `[logger]` table understood by sloggers. Without a `[logger]` table the log
//! level comes from the `CHIP8_LOG` environment variable.
use chip8vm::{Config, Emulator, HEIGHT, WIDTH};
use serde::Deserialize;
use slog::{error, info, Logger};
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::{Build, Config as LoggerBuildConfig, LoggerConfig};
use std::env;
use std::error::Error;
use std::process;

const DEFAULT_CYCLES: u64 = 1000;

#[derive(Default, Deserialize)]
#[serde(default)]
struct RunConfig {
    emulator: Config,
    logger: Option<LoggerConfig>,
}

fn build_logger(config: &RunConfig) -> Result<Logger, Box<dyn Error>> {
    if let Some(logger_config) = &config.logger {
        return Ok(logger_config.build_logger()?);
    }

    let level = match env::var("CHIP8_LOG").as_ref().map(String::as_str) {
        Ok("trace") => Severity::Trace,
        Ok("debug") => Severity::Debug,
        Ok("warning") => Severity::Warning,
        Ok("error") => Severity::Error,
        Ok("critical") => Severity::Critical,
        _ => Severity::Info,
    };

    let mut builder = TerminalLoggerBuilder::new();
    builder.level(level);
    builder.destination(Destination::Stderr);
    Ok(builder.build()?)
}

fn render(emulator: &Emulator) -> String {
    let mut out = String::with_capacity((WIDTH + 1) * HEIGHT);
    for row in emulator.display().iter() {
        out.extend(row.iter().map(|&p| if p == 1 { '#' } else { '.' }));
        out.push('\n');
    }
    out
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let rom = args
        .get(1)
        .ok_or("usage: chip8vm <rom> [cycles] [config.toml]")?;
    let cycles = match args.get(2) {
        Some(cycles) => cycles.parse::<u64>()?,
        None => DEFAULT_CYCLES,
    };
    let config: RunConfig = match args.get(3) {
        Some(path) => serdeconv::from_toml_file(path)?,
        None => RunConfig::default(),
    };

    let logger = build_logger(&config)?;
    let mut emulator = Emulator::with_rom_file(rom, config.emulator, Some(logger.clone()))?;

    let mut frames = 0;
    for cycle in 0..cycles {
        let op = emulator.step().map_err(|e| {
            error!(logger, "halted"; "cycle" => cycle, "error" => %e);
            e
        })?;

        if op.is_display_op() && emulator.take_should_draw() {
            frames += 1;
        }
        if emulator.take_should_sound() {
            info!(logger, "beep"; "cycle" => cycle);
        }
    }

    info!(logger, "finished"; "cycles" => cycles, "frames" => frames, "pc" => format!("{:#06X}", emulator.pc()));
    print!("{}", render(&emulator));
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("chip8vm: {}", e);
        process::exit(1);
    }
}
