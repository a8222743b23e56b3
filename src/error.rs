use std::io;
use thiserror::Error;

/// Everything that can stop the interpreter. None of these are recoverable from
/// inside a cycle: the cycle that produces one leaves the machine untouched and
/// the caller decides whether to abort or carry on.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("invalid op {opcode:04X}")]
    UnknownOpcode { opcode: u16 },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("stack overflow: all 16 return addresses are in use")]
    StackOverflow,

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("invalid key index {0:#X}, the keypad has 16 keys")]
    InvalidKey(u8),

    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("unable to read ROM: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
