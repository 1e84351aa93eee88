//! CPU and memory state.
use crate::{
    constants::*,
    error::{Chip8Error, Chip8Result},
    font::{FONTSET, LARGE_FONTSET},
};

/// Core state for a chip8 interpreter.
#[derive(Clone, PartialEq, Eq)]
pub struct Chip8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    /// Program counter pointing to the current position in the bytecode.
    pub(crate) pc: Address,
    /// Stack pointer, indicating the next free slot of the stack.
    pub(crate) sp: usize,
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    pub(crate) registers: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address. Since addresses are 12 bits, only the
    /// lowest (rightmost) bits are used.
    pub(crate) address: Address,
    /// (DT) Delay timer that counts down to 0.
    pub(crate) delay_timer: u8,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    pub(crate) sound_timer: u8,
    /// Switch tracking whether the buzzer should be silent.
    pub(crate) sound_off: bool,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory storage space.
    pub(crate) ram: Box<[u8; MEM_SIZE]>,
    /// Stack of return pointers used for jumping when a routine call finishes.
    pub(crate) stack: [Address; STACK_SIZE],
}

impl Default for Chip8Cpu {
    fn default() -> Self {
        let mut cpu = Self {
            pc: MEM_START as Address,
            sp: 0,
            registers: [0; REGISTER_COUNT],
            address: 0,
            delay_timer: 0,
            sound_timer: 0,
            sound_off: true,

            ram: Box::new([0; MEM_SIZE]),
            stack: [0; STACK_SIZE],
        };
        cpu.load_fonts();
        cpu
    }
}

impl Chip8Cpu {
    pub fn new() -> Self {
        Default::default()
    }

    /// Copy the built-in glyphs into the interpreter area of memory.
    fn load_fonts(&mut self) {
        let small = FONTSET_START as usize;
        let large = LARGE_FONTSET_START as usize;
        self.ram[small..small + FONTSET_DATA_LENGTH].copy_from_slice(&FONTSET);
        self.ram[large..large + LARGE_FONTSET_DATA_LENGTH].copy_from_slice(&LARGE_FONTSET);
    }

    /// Copy the program into memory at `MEM_START`.
    pub(crate) fn load_program(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if bytecode.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: bytecode.len(),
                capacity: MAX_PROGRAM_SIZE,
            });
        }

        self.ram[MEM_START..MEM_START + bytecode.len()].copy_from_slice(bytecode);

        Ok(())
    }

    /// Fetch the instruction at the program counter, and advance
    /// the program counter past it.
    pub(crate) fn fetch(&mut self) -> Chip8Result<u16> {
        let pc = self.pc as usize;
        if pc + 1 >= MEM_SIZE {
            return Err(Chip8Error::MemoryFault { address: pc + 1 });
        }

        let instr = ((self.ram[pc] as u16) << 8) | self.ram[pc + 1] as u16;
        self.pc += 2;

        Ok(instr)
    }

    /// Borrow `len` bytes of memory starting at `addr`.
    pub(crate) fn read(&self, addr: Address, len: usize) -> Chip8Result<&[u8]> {
        let start = addr as usize;
        let end = start + len;
        if end > MEM_SIZE {
            return Err(Chip8Error::MemoryFault {
                address: end - 1,
            });
        }
        Ok(&self.ram[start..end])
    }

    /// Mutably borrow `len` bytes of program memory starting at `addr`.
    ///
    /// The interpreter area, which holds the fonts, is read-only.
    pub(crate) fn write(&mut self, addr: Address, len: usize) -> Chip8Result<&mut [u8]> {
        let start = addr as usize;
        let end = start + len;
        if start < MEM_START {
            return Err(Chip8Error::MemoryFault { address: start });
        }
        if end > MEM_SIZE {
            return Err(Chip8Error::MemoryFault {
                address: end - 1,
            });
        }
        Ok(&mut self.ram[start..end])
    }

    /// Push a return address onto the call stack.
    pub(crate) fn push(&mut self, addr: Address) -> Chip8Result<()> {
        if self.sp >= STACK_SIZE {
            return Err(Chip8Error::StackOverflow);
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    /// Pop a return address from the call stack.
    pub(crate) fn pop(&mut self) -> Chip8Result<Address> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// Count down both timers by one tick.
    #[inline]
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
        self.sound_off = self.sound_timer == 0;
    }

    #[inline]
    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
        self.sound_off = value == 0;
    }

    /// Value of a general purpose register.
    #[inline(always)]
    pub fn register(&self, index: u8) -> u8 {
        self.registers[index as usize & 0xF]
    }

    /// Current program counter.
    pub fn pc(&self) -> Address {
        self.pc
    }

    /// Current index register.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current depth of the call stack.
    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// Read-only view of main memory.
    pub fn memory(&self) -> &[u8] {
        &self.ram[..]
    }
}
