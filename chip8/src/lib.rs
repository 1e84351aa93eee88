//! CHIP-8 and SUPER-CHIP interpreter.
mod bytecode;
mod clock;
pub mod constants;
mod cpu;
pub mod devices;
mod disasm;
mod display;
mod error;
mod font;
mod op;
mod quirks;
mod state;
mod vm;

pub use self::{
    clock::{Clock, TimerClock},
    display::{Display, Scroll},
    op::Op,
    quirks::Quirks,
    vm::{Flow, Hz},
};

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        cpu::Chip8Cpu,
        devices::{BufferingMode, FrameBlender, KeyCode, KeyInput, Surface},
        disasm::Disassembler,
        error::{Chip8Error, Chip8Result},
        quirks::Quirks,
        vm::{Chip8Conf, Chip8Vm, Flow, Hz},
    };
}
