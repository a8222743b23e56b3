//! Plays a ROM in a minifb window, reading the host keyboard through device_query.
//!
//! cargo run --example window -- games/PONG
use chip8vm::{AsKeyboard, Config, Emulator, Key, HEIGHT, WIDTH};
use device_query::{DeviceQuery, DeviceState, Keycode};
use minifb::{Scale, ScaleMode, Window, WindowOptions};
use slog::{info, o, Logger};
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;
use std::error::Error;
use std::time::Duration;

/// Cycles run between two window refreshes
const CYCLES_PER_FRAME: usize = 10;

struct Keyboard(pub DeviceState);

impl AsKeyboard for Keyboard {
    fn keys_down(&self) -> Vec<Key> {
        self.0
            .get_keys()
            .iter()
            .filter_map(|key: &Keycode| match key {
                Keycode::Key1 => Some(Key::Key1),
                Keycode::Key2 => Some(Key::Key2),
                Keycode::Key3 => Some(Key::Key3),
                Keycode::Key4 => Some(Key::C),
                Keycode::Q => Some(Key::Key4),
                Keycode::W => Some(Key::Key5),
                Keycode::E => Some(Key::Key6),
                Keycode::R => Some(Key::D),
                Keycode::A => Some(Key::Key7),
                Keycode::S => Some(Key::Key8),
                Keycode::D => Some(Key::Key9),
                Keycode::F => Some(Key::E),
                Keycode::Z => Some(Key::A),
                Keycode::X => Some(Key::Key0),
                Keycode::C => Some(Key::B),
                Keycode::V => Some(Key::F),
                _ => None,
            })
            .collect()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let rom = std::env::args().nth(1).unwrap_or_else(|| "games/PONG".to_string());

    let mut builder = TerminalLoggerBuilder::new();
    builder.level(Severity::Debug);
    builder.destination(Destination::Stderr);
    let logger: Logger = builder.build()?;
    let logger = logger.new(o!("rom" => rom.clone()));

    let mut window = Window::new(
        "Chip 8 Emulator (In Rust!)",
        WIDTH,
        HEIGHT,
        WindowOptions {
            resize: true,
            scale: Scale::X8,
            scale_mode: ScaleMode::UpperLeft,
            ..WindowOptions::default()
        },
    )?;

    // Limit to max update rate. This only needs about 60 Hz, which is 16ms
    window.limit_update_rate(Some(Duration::from_millis(16)));

    let mut emulator = Emulator::with_rom_file(&rom, Config::default(), Some(logger.clone()))?;
    let keyboard = Keyboard(DeviceState::new());

    while window.is_open() {
        emulator.handle_key_input(&keyboard);

        for _ in 0..CYCLES_PER_FRAME {
            emulator.step()?;
        }

        if emulator.take_should_sound() {
            info!(logger, "beep");
        }

        if emulator.take_should_draw() {
            window.update_with_buffer(&emulator.pixels(), WIDTH, HEIGHT)?;
        } else {
            window.update();
        }
    }

    Ok(())
}
