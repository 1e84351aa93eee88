//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
};

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug)]
pub enum Chip8Error {
    /// Attempt to load a program that can't fit in memory.
    RomTooLarge { size: usize, capacity: usize },
    /// The ROM file could not be read.
    RomUnreadable(io::Error),
    /// A save state or flag file could not be opened.
    PersistenceUnavailable(io::Error),
    /// The program counter or index register was driven outside of valid memory.
    MemoryFault { address: usize },
    /// Subroutine call nested deeper than the call stack allows.
    StackOverflow,
    /// Subroutine return with an empty call stack.
    StackUnderflow,
    /// Save state data could not be decoded.
    InvalidState(&'static str),
    Fmt(fmt::Error),
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::RomTooLarge { size, capacity } => write!(
                f,
                "program too large for VM memory: {size} bytes, capacity is {capacity} bytes"
            ),
            Self::RomUnreadable(err) => write!(f, "failed to read program: {err}"),
            Self::PersistenceUnavailable(err) => write!(f, "persistence unavailable: {err}"),
            Self::MemoryFault { address } => {
                write!(f, "memory fault: address {address:#05X} is out of range")
            }
            Self::StackOverflow => write!(f, "call stack overflow"),
            Self::StackUnderflow => write!(f, "call stack underflow"),
            Self::InvalidState(msg) => write!(f, "invalid save state: {msg}"),
            Self::Fmt(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Chip8Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RomUnreadable(err) | Self::PersistenceUnavailable(err) => Some(err),
            Self::Fmt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<fmt::Error> for Chip8Error {
    fn from(err: fmt::Error) -> Self {
        Chip8Error::Fmt(err)
    }
}
