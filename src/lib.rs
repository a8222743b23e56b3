//! A CHIP-8 interpreter core. The [`Emulator`] owns the whole machine and is
//! advanced one instruction at a time by [`Emulator::step`]; windowing, audio,
//! host key mapping and pacing are left to whoever drives it.

// # Interpreter
// * 4096 (0x1000) bytes of memory
// * the font set lives in the first bytes of the reserved 512 (0x200) byte area
// * programs are loaded at 0x200
// * 16 8-bit registers: V0 - VF
// * VF is the carry flag in addition operations, "no borrow" flag in subtraction, in draw
// operation the VF flag is set to denote pixel collision
// * the address register I is 16 bits wide
// * the stack is only used to store return addresses when subroutines are called

// # Timers
// * two 8-bit timers, each decremented once per cycle while nonzero
//  - delay timer is used for events, it can be set and read
//  - sound timer raises the sound signal when it runs out

// # Input
// there is a 16 symbol hex keyboard with values 0 - F. There are 3 opcode that deal with handling input
//  - one skips an instruction if a specific key is pressed
//  - one skips an instruction if a specific key is NOT pressed
//  - waits for a key press and stores it in a register once it detects it

// # Graphics
// 64x32 pixels


pub mod config;
pub mod error;
pub mod graphics;
pub mod keyboard;
pub mod op;

pub use config::{BcdOnes, BulkIndex, Config, Quirks};
pub use error::{Chip8Error, Result};
pub use graphics::{Grid, HEIGHT, WIDTH};
pub use keyboard::{AsKeyboard, Key};
pub use op::Op;

use graphics::Graphics;
use keyboard::Keyboard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slog::{debug, error, info, o, trace, Discard, Logger};
use std::fs;
use std::ops::Range;
use std::path::Path;

pub const MEMORY_SIZE: usize = 0x1000;
pub const STARTING_MEMORY_BYTE: usize = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - STARTING_MEMORY_BYTE;
pub const STACK_SIZE: usize = 16;
pub const NUM_REGISTERS: usize = 16;
pub const NUM_BYTES_IN_FONT_CHAR: u8 = 5;

const FLAG: usize = 0xF;

const FONT_SET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The whole CHIP-8 machine: memory, registers, stack, timers, display and keypad
pub struct Emulator {
    memory: [u8; MEMORY_SIZE],

    stack: [u16; STACK_SIZE], // return addresses for up to 16 nested calls
    sp: usize,                // number of return addresses on the stack

    addr: u16, // address register I
    pc: u16,   // program counter

    // 16 8-bit registers. VF is used as a flag by several of the ops (see `Op`)
    v: [u8; NUM_REGISTERS],

    graphics: Graphics,
    keyboard: Keyboard,

    delay_timer: u8,
    sound_timer: u8,

    should_draw: bool,
    should_sound: bool,

    quirks: Quirks,
    rng: StdRng,
    logger: Logger,
}

impl Emulator {
    /// Create an emulator with the default quirks. Pass `None` to discard all log output
    pub fn new(logger: Option<Logger>) -> Self {
        Self::with_config(Config::default(), logger)
    }

    pub fn with_config(config: Config, logger: Option<Logger>) -> Self {
        let logger = logger.unwrap_or_else(|| Logger::root(Discard, o!()));
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut memory = [0; MEMORY_SIZE];
        memory[..FONT_SET.len()].copy_from_slice(&FONT_SET);

        debug!(logger, "emulator created"; "quirks" => ?config.quirks, "seed" => ?config.rng_seed);

        Emulator {
            memory,
            stack: [0; STACK_SIZE],
            sp: 0,
            addr: 0,
            pc: STARTING_MEMORY_BYTE as u16,
            v: [0; NUM_REGISTERS],
            graphics: Graphics::new(),
            keyboard: Keyboard::new(),
            delay_timer: 0,
            sound_timer: 0,
            // a fresh machine asks for a first frame and a startup beep
            should_draw: true,
            should_sound: true,
            quirks: config.quirks,
            rng,
            logger,
        }
    }

    /// Create an emulator and load the raw ROM at `path` into it
    pub fn with_rom_file<P: AsRef<Path>>(
        path: P,
        config: Config,
        logger: Option<Logger>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let program = fs::read(path)?;

        let mut emulator = Self::with_config(config, logger);
        info!(emulator.logger, "reading rom"; "path" => %path.display());
        emulator.load_program(&program)?;
        Ok(emulator)
    }

    /// Copy a program into memory starting at 0x200. Nothing else is touched
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            error!(self.logger, "rom does not fit in memory"; "size" => program.len());
            return Err(Chip8Error::RomTooLarge {
                size: program.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }

        let end = STARTING_MEMORY_BYTE + program.len();
        self.memory[STARTING_MEMORY_BYTE..end].copy_from_slice(program);
        info!(self.logger, "loaded rom"; "bytes" => program.len());
        Ok(())
    }

    /// Run one fetch-decode-execute cycle and then tick the timers. Returns the
    /// op that was executed.
    ///
    /// A cycle that fails leaves the machine exactly as it was, timers included.
    pub fn step(&mut self) -> Result<Op> {
        let word = self.fetch()?;
        let op = Op::decode(word).map_err(|e| {
            error!(self.logger, "decode failed"; "pc" => format!("{:#06X}", self.pc), "word" => format!("{:04X}", word));
            e
        })?;

        trace!(self.logger, "execute"; "pc" => format!("{:#06X}", self.pc), "op" => ?op);

        if let Err(e) = self.execute(op) {
            error!(self.logger, "execution failed"; "pc" => format!("{:#06X}", self.pc), "op" => ?op, "error" => %e);
            return Err(e);
        }

        self.decrement_timers_after_cycle();
        Ok(op)
    }

    /// Returns whether the display changed since the last call, and resets the signal
    pub fn take_should_draw(&mut self) -> bool {
        std::mem::replace(&mut self.should_draw, false)
    }

    /// Returns whether the sound timer ran out since the last call, and resets the signal
    pub fn take_should_sound(&mut self) -> bool {
        std::mem::replace(&mut self.should_sound, false)
    }

    /// Press or release one of the 16 keypad keys
    pub fn set_key(&mut self, idx: u8, pressed: bool) -> Result<()> {
        self.keyboard.set_key(idx, pressed)
    }

    /// Replace the keypad state with the keys the front end reports as held
    pub fn handle_key_input(&mut self, keyboard: &impl AsKeyboard) {
        self.keyboard.update(&keyboard.keys_down());
    }

    pub fn display(&self) -> &Grid {
        self.graphics.grid()
    }

    /// One `u32` per pixel, row major, 0xFFFFFF for lit pixels
    pub fn pixels(&self) -> Vec<u32> {
        self.graphics.pixels()
    }

    /// Four bytes per pixel, row major, white for lit pixels and black otherwise
    pub fn rgba(&self) -> Vec<u8> {
        self.graphics.rgba()
    }

    pub fn registers(&self) -> &[u8; NUM_REGISTERS] {
        &self.v
    }

    /// The address register I
    pub fn addr(&self) -> u16 {
        self.addr
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    /// Read the big-endian instruction word at the program counter
    fn fetch(&self) -> Result<u16> {
        let range = self.mem_range(self.pc as usize, 2)?;
        let bytes = &self.memory[range];
        Ok(u16::from(bytes[0]) << 8 | u16::from(bytes[1]))
    }

    /// The memory range `start..start + len`, or the first address past the end of memory
    fn mem_range(&self, start: usize, len: usize) -> Result<Range<usize>> {
        let end = start + len;
        if end > MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds {
                address: start.max(MEMORY_SIZE),
            });
        }
        Ok(start..end)
    }

    fn skip_if(&mut self, cond: bool) {
        self.pc += if cond { 4 } else { 2 };
    }

    /// Apply a single op to the machine. Everything that can fail is checked
    /// before the first write.
    fn execute(&mut self, op: Op) -> Result<()> {
        match op {
            Op::Cls => {
                self.graphics.clear();
                self.should_draw = true;
                self.pc += 2;
            }
            Op::Ret => {
                if self.sp == 0 {
                    return Err(Chip8Error::StackUnderflow);
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp] + 2;
            }
            Op::Jp { addr } => self.pc = addr,
            Op::Call { addr } => {
                if self.sp >= STACK_SIZE {
                    return Err(Chip8Error::StackOverflow);
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = addr;
            }
            Op::SeByte { x, kk } => self.skip_if(self.v[x as usize] == kk),
            Op::SneByte { x, kk } => self.skip_if(self.v[x as usize] != kk),
            Op::SeReg { x, y } => self.skip_if(self.v[x as usize] == self.v[y as usize]),
            Op::LdByte { x, kk } => {
                self.v[x as usize] = kk;
                self.pc += 2;
            }
            Op::AddByte { x, kk } => {
                self.v[x as usize] = self.v[x as usize].wrapping_add(kk);
                self.pc += 2;
            }
            Op::LdReg { x, y } => {
                self.v[x as usize] = self.v[y as usize];
                self.pc += 2;
            }
            Op::Or { x, y } => {
                self.v[x as usize] |= self.v[y as usize];
                self.pc += 2;
            }
            Op::And { x, y } => {
                self.v[x as usize] &= self.v[y as usize];
                self.pc += 2;
            }
            Op::Xor { x, y } => {
                self.v[x as usize] ^= self.v[y as usize];
                self.pc += 2;
            }
            // the flag ops write VF before computing Vx, so with x or y == F the
            // result is computed from the fresh flag
            Op::AddReg { x, y } => {
                let (x, y) = (x as usize, y as usize);
                self.v[FLAG] = if self.v[y] > 0xFF - self.v[x] { 1 } else { 0 };
                self.v[x] = self.v[x].wrapping_add(self.v[y]);
                self.pc += 2;
            }
            Op::Sub { x, y } => {
                let (x, y) = (x as usize, y as usize);
                self.v[FLAG] = if self.v[y] > self.v[x] { 0 } else { 1 };
                self.v[x] = self.v[x].wrapping_sub(self.v[y]);
                self.pc += 2;
            }
            Op::Shr { x } => {
                let x = x as usize;
                self.v[FLAG] = self.v[x] & 0x1;
                self.v[x] >>= 1;
                self.pc += 2;
            }
            Op::Subn { x, y } => {
                let (x, y) = (x as usize, y as usize);
                self.v[FLAG] = if self.v[x] > self.v[y] { 0 } else { 1 };
                self.v[x] = self.v[y].wrapping_sub(self.v[x]);
                self.pc += 2;
            }
            Op::Shl { x } => {
                let x = x as usize;
                self.v[FLAG] = self.v[x] >> 7;
                self.v[x] <<= 1;
                self.pc += 2;
            }
            Op::SneReg { x, y } => self.skip_if(self.v[x as usize] != self.v[y as usize]),
            Op::LdI { addr } => {
                self.addr = addr;
                self.pc += 2;
            }
            Op::JpV0 { addr } => self.pc = addr + u16::from(self.v[0]),
            Op::Rnd { x, kk } => {
                self.v[x as usize] = self.rng.gen::<u8>() & kk;
                self.pc += 2;
            }
            Op::Drw { x, y, n } => {
                let rows = self.mem_range(self.addr as usize, n as usize)?;
                let rx = self.v[x as usize] as usize;
                let ry = self.v[y as usize] as usize;

                let mut collision = false;
                for (i, mem_idx) in rows.enumerate() {
                    if self.graphics.draw_row(rx, ry + i, self.memory[mem_idx]) {
                        collision = true;
                    }
                }

                self.v[FLAG] = collision as u8;
                self.should_draw = true;
                self.pc += 2;
            }
            Op::Skp { x } => {
                let pressed = self.keyboard.get_key_state(self.v[x as usize])?;
                self.skip_if(pressed);
            }
            Op::Sknp { x } => {
                let pressed = self.keyboard.get_key_state(self.v[x as usize])?;
                self.skip_if(!pressed);
            }
            Op::LdVxDt { x } => {
                self.v[x as usize] = self.delay_timer;
                self.pc += 2;
            }
            Op::LdVxK { x } => match self.keyboard.pressed_key() {
                Some(key) => {
                    self.v[x as usize] = key;
                    self.pc += 2;
                }
                // no key yet, run this op again next cycle
                None => {
                    trace!(self.logger, "waiting for key"; "register" => x);
                }
            },
            Op::LdDtVx { x } => {
                self.delay_timer = self.v[x as usize];
                self.pc += 2;
            }
            Op::LdStVx { x } => {
                self.sound_timer = self.v[x as usize];
                self.pc += 2;
            }
            Op::AddI { x } => {
                let x = x as usize;
                self.v[FLAG] = if u32::from(self.addr) + u32::from(self.v[x]) > 0xFFF {
                    1
                } else {
                    0
                };
                self.addr = self.addr.wrapping_add(u16::from(self.v[x]));
                self.pc += 2;
            }
            Op::LdF { x } => {
                self.addr = u16::from(self.v[x as usize]) * u16::from(NUM_BYTES_IN_FONT_CHAR);
                self.pc += 2;
            }
            Op::LdB { x } => {
                let range = self.mem_range(self.addr as usize, 3)?;
                let val = self.v[x as usize];
                let ones = match self.quirks.bcd_ones {
                    BcdOnes::Legacy => (val % 100) / 10,
                    BcdOnes::Canonical => val % 10,
                };
                self.memory[range].copy_from_slice(&[val / 100, (val / 10) % 10, ones]);
                self.pc += 2;
            }
            Op::StoreRegs { x } => {
                let count = x as usize + 1;
                let range = self.mem_range(self.addr as usize, count)?;
                self.memory[range].copy_from_slice(&self.v[..count]);
                self.update_addr_after_bulk(x);
                self.pc += 2;
            }
            Op::LoadRegs { x } => {
                let count = x as usize + 1;
                let range = self.mem_range(self.addr as usize, count)?;
                self.v[..count].copy_from_slice(&self.memory[range]);
                self.update_addr_after_bulk(x);
                self.pc += 2;
            }
        }

        Ok(())
    }

    fn update_addr_after_bulk(&mut self, x: u8) {
        let count = u16::from(x) + 1;
        match self.quirks.bulk_index {
            BulkIndex::Advance => self.addr = self.addr.wrapping_add(count),
            BulkIndex::SetToCount => self.addr = count,
            BulkIndex::Unchanged => {}
        }
    }

    /// Both timers count down once per cycle. The sound signal is raised on the
    /// cycle the sound timer goes from 1 to 0
    fn decrement_timers_after_cycle(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        if self.sound_timer > 0 {
            if self.sound_timer == 1 {
                debug!(self.logger, "sound timer expired");
                self.should_sound = true;
            }
            self.sound_timer -= 1;
        }
    }
}
