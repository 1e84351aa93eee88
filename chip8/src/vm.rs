//! Virtual machine.
use std::{
    fmt::{self, Write},
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use rand::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    clock::TimerClock,
    constants::*,
    cpu::Chip8Cpu,
    devices::{FileFlagStore, FlagStore, KeyInput},
    display::{Display, Scroll},
    error::{Chip8Error, Chip8Result},
    font::{glyph_address, large_glyph_address},
    op::Op,
    quirks::Quirks,
};

pub struct Chip8Vm {
    pub(crate) cpu: Chip8Cpu,
    pub(crate) display: Display,
    pub(crate) timer: TimerClock,
    pub(crate) quirks: Quirks,
    /// Set by `00FD`, the host should stop calling `step`.
    pub(crate) exit: bool,
    flags: Box<dyn FlagStore>,
    rng: StdRng,
    conf: Chip8Conf,
}

impl Chip8Vm {
    pub fn new(conf: Chip8Conf) -> Self {
        Chip8Vm {
            cpu: Chip8Cpu::new(),
            display: Display::new(),
            timer: TimerClock::new(),
            quirks: conf.quirks,
            exit: false,
            flags: Box::new(FileFlagStore::new(&conf.flags_file)),
            rng: StdRng::from_entropy(),
            conf,
        }
    }

    /// Replace the storage used by the RPL user flag instructions.
    pub fn with_flag_store(mut self, store: impl FlagStore + 'static) -> Self {
        self.flags = Box::new(store);
        self
    }

    /// Seed the random number generator used by `CXNN`, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Chip8Conf {
        &self.conf
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Load a program into memory at `MEM_START`.
    ///
    /// The rest of memory is left as it is, so this is expected to be
    /// called on a freshly created or reset machine.
    pub fn load_rom(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        self.cpu.load_program(bytecode)?;
        log::debug!("loaded program of {} bytes", bytecode.len());
        Ok(())
    }

    /// Read a program from a file, and load it into memory.
    pub fn load_rom_file(&mut self, filepath: impl AsRef<Path>) -> Chip8Result<()> {
        let bytecode = fs::read(filepath.as_ref()).map_err(Chip8Error::RomUnreadable)?;
        self.load_rom(&bytecode)
    }

    /// Return the machine to its power-on state, keeping the configuration.
    pub fn reset(&mut self) {
        self.cpu = Chip8Cpu::new();
        self.display = Display::new();
        self.timer = TimerClock::new();
        self.quirks = self.conf.quirks;
        self.exit = false;
    }

    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Physical display cells, `DISPLAY_WIDTH` x `DISPLAY_HEIGHT`.
    pub fn display_buffer(&self) -> &[u8] {
        self.display.buffer()
    }

    /// Whether the display changed since the host last took the flag.
    pub fn is_dirty(&self) -> bool {
        self.display.is_dirty()
    }

    /// Clear the display dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        self.display.take_dirty()
    }

    /// The buzzer should be silent.
    pub fn sound_off(&self) -> bool {
        self.cpu.sound_off
    }

    /// The program executed `00FD`.
    pub fn exit_requested(&self) -> bool {
        self.exit
    }
}

/// Outcome of a single interpreter step, used by the host to decide what
/// to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is useful for the caller to avoid being
    /// blocked on infinite or long running loops.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// The display buffer was modified.
    Draw,
    /// The sound timer was set.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stops
    /// execution until a key is pressed, and loads the key value into `Vx`.
    KeyWait,
    /// The program asked the interpreter to exit.
    Exit,
    /// The instruction is not part of the instruction set, and was skipped.
    Unknown(u16),
}

/// VM Configuration Parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Chip8Conf {
    /// Instruction rate the host should run the interpreter at.
    pub clock_frequency: Option<Hz>,
    pub quirks: Quirks,
    /// File used by save and load state requests.
    pub state_file: PathBuf,
    /// File backing the SUPER-CHIP RPL user flags.
    pub flags_file: PathBuf,
}

impl Default for Chip8Conf {
    fn default() -> Self {
        Self {
            clock_frequency: None,
            quirks: Quirks::default(),
            state_file: PathBuf::from(STATE_FILE_NAME),
            flags_file: PathBuf::from(RPL_FILE_NAME),
        }
    }
}

impl Chip8Conf {
    /// Time between instructions, falling back to `DEFAULT_CLOCK_FREQUENCY`.
    pub fn clock_interval(&self) -> Duration {
        self.clock_frequency
            .unwrap_or(Hz(DEFAULT_CLOCK_FREQUENCY))
            .into()
    }
}

/// CPU clock frequency, in hertz (per second)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// Interpreter
impl Chip8Vm {
    /// Count down the delay and sound timers when the 60 Hz deadline has passed.
    ///
    /// Fires at most once per call.
    pub fn advance_timers(&mut self, now: Duration) {
        if self.timer.tick(now) {
            self.cpu.tick_timers();
        }
    }

    /// Execute a single instruction.
    ///
    /// `input` is the keyboard state for this cycle, and `now` is the time
    /// elapsed since the host started, which drives the timers.
    pub fn step(&mut self, input: KeyInput, now: Duration) -> Chip8Result<Flow> {
        self.advance_timers(now);

        let pc = self.cpu.pc;
        let instr = self.cpu.fetch()?;

        match Op::decode(instr) {
            Some(op) => {
                op_trace(pc, op);
                self.exec(op, input)
            }
            None => {
                log::info!("unrecognised instruction {instr:04X} at {pc:03X}");
                Ok(Flow::Unknown(instr))
            }
        }
    }

    /// Execute up to `step_count` instructions with the same input and time,
    /// stopping early when the program exits.
    pub fn run_steps(
        &mut self,
        step_count: usize,
        input: KeyInput,
        now: Duration,
    ) -> Chip8Result<Flow> {
        let mut flow = Flow::Ok;

        for _ in 0..step_count {
            flow = self.step(input, now)?;
            if flow == Flow::Exit {
                break;
            }
        }

        Ok(flow)
    }

    #[inline(always)]
    fn reg(&self, index: u8) -> u8 {
        self.cpu.registers[index as usize]
    }

    #[inline(always)]
    fn set_reg(&mut self, index: u8, value: u8) {
        self.cpu.registers[index as usize] = value;
    }

    #[inline(always)]
    fn set_flag(&mut self, value: bool) {
        self.cpu.registers[FLAG_REGISTER] = value as u8;
    }

    #[inline(always)]
    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.cpu.pc = self.cpu.pc.wrapping_add(2);
        }
    }

    /// Scroll amount in physical cells.
    #[inline]
    fn scroll_cells(&self, pixels: u8) -> usize {
        if self.quirks.legacy_scroll {
            pixels as usize
        } else {
            pixels as usize * self.display.scale()
        }
    }

    fn exec(&mut self, op: Op, input: KeyInput) -> Chip8Result<Flow> {
        let mut control_flow = Flow::Ok;

        match op {
            // 00E0 (CLS)
            Op::ClearScreen => {
                self.display.clear();
                control_flow = Flow::Draw;
            }
            // 00EE (RET)
            //
            // Return from a subroutine.
            // Set the program counter to the value at the top of the stack.
            Op::Return => {
                self.cpu.pc = self.cpu.pop()?;
                control_flow = Flow::Jump;
            }
            // 00CN (SCD nibble)
            Op::ScrollDown { n } => {
                self.display.scroll(Scroll::Down, self.scroll_cells(n));
                control_flow = Flow::Draw;
            }
            // 00FB (SCR)
            Op::ScrollRight => {
                self.display.scroll(Scroll::Right, self.scroll_cells(4));
                control_flow = Flow::Draw;
            }
            // 00FC (SCL)
            Op::ScrollLeft => {
                self.display.scroll(Scroll::Left, self.scroll_cells(4));
                control_flow = Flow::Draw;
            }
            // 00FD (EXIT)
            Op::Exit => {
                self.exit = true;
                control_flow = Flow::Exit;
            }
            // 00FE (LOW)
            Op::LowRes => self.display.set_high_resolution(false),
            // 00FF (HIGH)
            Op::HighRes => self.display.set_high_resolution(true),
            // 1NNN (JP addr)
            Op::JumpAddress { address } => {
                self.cpu.pc = address;
                control_flow = Flow::Jump;
            }
            // 2NNN (CALL addr)
            //
            // The program counter already points past the call,
            // which is where the subroutine returns to.
            Op::Call { address } => {
                self.cpu.push(self.cpu.pc)?;
                self.cpu.pc = address;
                control_flow = Flow::Jump;
            }
            // 3XNN (SE Vx, byte)
            Op::Skip_Eq_Byte { vx, nn } => self.skip_if(self.reg(vx) == nn),
            // 4XNN (SNE Vx, byte)
            Op::Skip_NotEq_Byte { vx, nn } => self.skip_if(self.reg(vx) != nn),
            // 5XY0 (SE Vx, Vy)
            Op::Skip_Eq { vx, vy } => self.skip_if(self.reg(vx) == self.reg(vy)),
            // 9XY0 (SNE Vx, Vy)
            Op::Skip_NotEq { vx, vy } => self.skip_if(self.reg(vx) != self.reg(vy)),
            // 6XNN (LD Vx, byte)
            Op::Load_Byte { vx, nn } => self.set_reg(vx, nn),
            // 7XNN (ADD Vx, byte)
            //
            // Carry flag is not set.
            Op::Add_Byte { vx, nn } => self.set_reg(vx, self.reg(vx).wrapping_add(nn)),
            // Arithmetic instructions
            Op::Load_Vx_Vy { .. }
            | Op::Or_Vx_Vy { .. }
            | Op::And_Vx_Vy { .. }
            | Op::Xor_Vx_Vy { .. }
            | Op::Add_Vx_Vy { .. }
            | Op::Sub_Vx_Vy { .. }
            | Op::ShiftRight { .. }
            | Op::SubReverse_Vx_Vy { .. }
            | Op::ShiftLeft { .. } => control_flow = self.exec_math(op),
            // ANNN (LD I, addr)
            Op::Load_Address { address } => self.cpu.address = address,
            // BNNN (JP V0, addr)
            //
            // Jump to NNN plus an offset. The offset register is V0 on the
            // COSMAC VIP, and VX (the high nibble of NNN) on later interpreters.
            Op::Jump_Offset { vx, address } => {
                let offset = if self.quirks.legacy_jump_offset {
                    self.reg(0)
                } else {
                    self.reg(vx)
                };
                self.cpu.pc = address + offset as Address;
                control_flow = Flow::Jump;
            }
            // CXNN (RND Vx, byte)
            //
            // Set register VX to the result of bitwise AND between a random number and NN.
            Op::Random { vx, nn } => {
                let value = self.rng.gen::<u8>() & nn;
                self.set_reg(vx, value);
            }
            // DXYN (DRW Vx, Vy, nibble)
            //
            // Draw sprite to the display buffer, at coordinate as per registers Vx and Vy.
            // Sprite is encoded as 8 pixels wide, N pixels high, stored in bits located in
            // memory pointed to by address register I. When N is zero the sprite is
            // 16x16, two bytes per row.
            //
            // If the drawing operation erases existing pixels in the display buffer, register VF is set to
            // 1, and set to 0 if no display bits are unset. This is used for collision detection.
            Op::Draw { vx, vy, n } => {
                let (rows, row_bytes) = if n == 0 { (16, 2) } else { (n as usize, 1) };
                let (x, y) = (self.reg(vx), self.reg(vy));

                let sprite = self.cpu.read(self.cpu.address, rows * row_bytes)?;
                let is_erased = self.display.draw_sprite(x, y, sprite, row_bytes);

                self.set_flag(is_erased);
                control_flow = Flow::Draw;
            }
            // Keyboard and miscellaneous instructions
            _ => control_flow = self.exec_misc(op, input)?,
        }

        Ok(control_flow)
    }

    /// Execute an arithmetic instruction
    ///
    /// Operands are read before any register is written, and the flag
    /// register is written last. When VF is the destination, it ends up
    /// holding the flag.
    #[inline]
    fn exec_math(&mut self, op: Op) -> Flow {
        match op {
            // 8XY0 (LD Vx, Vy)
            Op::Load_Vx_Vy { vx, vy } => self.set_reg(vx, self.reg(vy)),
            // 8XY1 (OR Vx, Vy)
            Op::Or_Vx_Vy { vx, vy } => self.set_reg(vx, self.reg(vx) | self.reg(vy)),
            // 8XY2 (AND Vx, Vy)
            Op::And_Vx_Vy { vx, vy } => self.set_reg(vx, self.reg(vx) & self.reg(vy)),
            // 8XY3 (XOR Vx, Vy)
            Op::Xor_Vx_Vy { vx, vy } => self.set_reg(vx, self.reg(vx) ^ self.reg(vy)),
            // 8XY4 (ADD Vx, Vy)
            //
            // If overflow, set VF to 1, else 0.
            Op::Add_Vx_Vy { vx, vy } => {
                let (result, carry) = self.reg(vx).overflowing_add(self.reg(vy));
                self.set_reg(vx, result);
                self.set_flag(carry);
            }
            // 8XY5 (SUB Vx, Vy)
            //
            // VF is set to 0 when there is a borrow, set to 1 when there isn't.
            Op::Sub_Vx_Vy { vx, vy } => {
                let (result, borrow) = self.reg(vx).overflowing_sub(self.reg(vy));
                self.set_reg(vx, result);
                self.set_flag(!borrow);
            }
            // 8XY7 (SUBN Vx, Vy)
            //
            // Subtracts VX from VY, and stores the result in VX.
            Op::SubReverse_Vx_Vy { vx, vy } => {
                let (result, borrow) = self.reg(vy).overflowing_sub(self.reg(vx));
                self.set_reg(vx, result);
                self.set_flag(!borrow);
            }
            // 8XY6 (SHR Vx {, Vy})
            //
            // VF is set to the least-significant bit before the shift.
            Op::ShiftRight { vx, vy } => {
                let value = self.shift_source(vx, vy);
                self.set_reg(vx, value >> 1);
                self.cpu.registers[FLAG_REGISTER] = value & 1;
            }
            // 8XYE (SHL Vx {, Vy})
            //
            // VF is set to the most-significant bit before the shift.
            Op::ShiftLeft { vx, vy } => {
                let value = self.shift_source(vx, vy);
                self.set_reg(vx, value << 1);
                self.cpu.registers[FLAG_REGISTER] = (value >> 7) & 1;
            }
            _ => unreachable!("not an arithmetic instruction: {op:?}"),
        }

        Flow::Ok
    }

    /// Value shifted by `8XY6` and `8XYE`.
    #[inline(always)]
    fn shift_source(&self, vx: u8, vy: u8) -> u8 {
        if self.quirks.legacy_shift {
            self.reg(vy)
        } else {
            self.reg(vx)
        }
    }

    /// Execute a keyboard, timer or memory instruction
    fn exec_misc(&mut self, op: Op, input: KeyInput) -> Chip8Result<Flow> {
        let mut control_flow = Flow::Ok;

        match op {
            // ----------------------------------------------------------------
            // Ex9E (SKP Vx)
            Op::Skip_Key { vx } => self.skip_if(input.is_down(self.reg(vx))),
            // ExA1 (SKNP Vx)
            Op::Skip_NotKey { vx } => self.skip_if(!input.is_down(self.reg(vx))),
            // ----------------------------------------------------------------
            // Fx07 (LD Vx, DT)
            Op::Load_Vx_Delay { vx } => self.set_reg(vx, self.cpu.delay_timer),
            // Fx0A (LD Vx, K)
            //
            // Wait for a key press, store the value of the key in Vx.
            Op::Load_Vx_Key { vx } => match input.key() {
                Some(key) => self.set_reg(vx, key),
                None => {
                    // rewind the program counter to retry on the next step
                    self.cpu.pc -= 2;
                    control_flow = Flow::KeyWait;
                }
            },
            // Fx15 (LD DT, Vx)
            Op::Load_Delay_Vx { vx } => self.cpu.delay_timer = self.reg(vx),
            // Fx18 (LD ST, Vx)
            Op::Load_Sound_Vx { vx } => {
                self.cpu.set_sound_timer(self.reg(vx));
                control_flow = Flow::Sound;
            }
            // Fx1E (ADD I, Vx)
            //
            // VF is set when I overflows past the addressable range, as the
            // Amiga interpreter does. Otherwise VF is untouched.
            Op::Add_Address_Vx { vx } => {
                let sum = self.cpu.address + self.reg(vx) as Address;
                if sum > ADDRESS_MASK {
                    self.set_flag(true);
                }
                self.cpu.address = sum & ADDRESS_MASK;
            }
            // Fx29 (LD F, Vx)
            //
            // Set I = location of sprite for digit Vx. Values past 0xF
            // select the large glyph of the low nibble.
            Op::Load_Glyph { vx } => {
                let digit = self.reg(vx);
                self.cpu.address = if digit < 0x10 {
                    glyph_address(digit)
                } else {
                    large_glyph_address(digit)
                };
            }
            // Fx30 (LD HF, Vx)
            Op::Load_LargeGlyph { vx } => {
                self.cpu.address = large_glyph_address(self.reg(vx));
            }
            // Fx33 (LD B, Vx)
            //
            // Store the binary-coded decimal representation of Vx
            // in the memory locations I, I+1, and I+2.
            #[rustfmt::skip]
            Op::Store_Bcd { vx } => {
                let x = self.reg(vx);
                let mem = self.cpu.write(self.cpu.address, 3)?;
                mem[0] = x / 100 % 10;
                mem[1] = x / 10  % 10;
                mem[2] = x       % 10;
            }
            // Fx55 (LD [I], Vx)
            //
            // Store registers V0 through Vx in memory starting at location I.
            Op::Store_Registers { vx } => {
                let count = vx as usize + 1;
                let registers = self.cpu.registers;
                self.cpu
                    .write(self.cpu.address, count)?
                    .copy_from_slice(&registers[..count]);
                self.advance_index(count);
            }
            // Fx65 (LD Vx, [I])
            //
            // Read registers V0 through Vx from memory starting at location I.
            Op::Load_Registers { vx } => {
                let count = vx as usize + 1;
                let mut buf = [0; REGISTER_COUNT];
                buf[..count].copy_from_slice(self.cpu.read(self.cpu.address, count)?);
                self.cpu.registers[..count].copy_from_slice(&buf[..count]);
                self.advance_index(count);
            }
            // Fx75 (LD R, Vx)
            //
            // Store V0 through Vx in the RPL user flags, at most V7.
            Op::Store_Flags { vx } => {
                let count = (vx as usize).min(RPL_FLAG_COUNT - 1) + 1;
                if let Err(err) = self.flags.store(&self.cpu.registers[..count]) {
                    log::warn!("failed to store RPL flags: {err}");
                }
            }
            // Fx85 (LD Vx, R)
            //
            // Read V0 through Vx from the RPL user flags, at most V7.
            Op::Load_Flags { vx } => {
                let count = (vx as usize).min(RPL_FLAG_COUNT - 1) + 1;
                let mut buf = [0; RPL_FLAG_COUNT];
                match self.flags.load(&mut buf[..count]) {
                    Ok(read) => self.cpu.registers[..read].copy_from_slice(&buf[..read]),
                    Err(err) => log::warn!("failed to load RPL flags: {err}"),
                }
            }
            _ => unreachable!("not a miscellaneous instruction: {op:?}"),
        }

        Ok(control_flow)
    }

    /// COSMAC VIP leaves I pointing past the last register transferred.
    #[inline]
    fn advance_index(&mut self, count: usize) {
        if self.quirks.legacy_index_increment {
            self.cpu.address = (self.cpu.address + count as Address) & ADDRESS_MASK;
        }
    }
}

/// Host controls
impl Chip8Vm {
    /// Apply the control signals carried in the high bits of the key input.
    ///
    /// Persistence failures are logged, and leave the machine untouched.
    pub fn service_controls(&mut self, input: KeyInput) {
        if input.save_requested() {
            let path = self.conf.state_file.clone();
            match self.save_state_file(&path) {
                Ok(()) => log::info!("saved state to {}", path.display()),
                Err(err) => log::warn!("failed to save state: {err}"),
            }
        }

        if input.load_requested() {
            let path = self.conf.state_file.clone();
            match self.load_state_file(&path) {
                Ok(()) => log::info!("loaded state from {}", path.display()),
                Err(err) => log::warn!("failed to load state: {err}"),
            }
        }

        if input.redraw_requested() {
            self.display.mark_dirty();
        }
    }
}

/// Troubleshooting
#[doc(hidden)]
impl Chip8Vm {
    /// Returns the contents of the memory as a human readable string.
    pub fn dump_ram(&self, addr: usize, count: usize) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        let end = (addr + count).min(MEM_SIZE);

        write!(buf, "* Memory [0x{addr:03X}...0x{end:03X}]")?;
        for i in addr..end {
            if (i - addr) % 4 == 0 {
                writeln!(buf)?;
            }
            write!(buf, "{i:03X}: {:02X} ", self.cpu.ram[i])?;
        }
        writeln!(buf)?;

        Ok(buf)
    }

    pub fn dump_display(&self) -> Result<String, fmt::Error> {
        self.display.dump()
    }

    /// Registers, pointers and call stack.
    pub fn dump_state(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        writeln!(buf, "* Registers")?;
        for (r, values) in self.cpu.registers.chunks(4).enumerate() {
            let line = values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("V{:X}: {v:02X}", r * 4 + i))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(buf, "{line}")?;
        }

        writeln!(buf)?;
        writeln!(buf, "pc: {:03X} ({})", self.cpu.pc, self.cpu.pc)?;
        writeln!(buf, "I : {:03X} ({})", self.cpu.address, self.cpu.address)?;
        writeln!(buf, "sp: {:02X} ({})", self.cpu.sp, self.cpu.sp)?;
        writeln!(
            buf,
            "dt: {:02X}, st: {:02X}",
            self.cpu.delay_timer, self.cpu.sound_timer
        )?;

        writeln!(buf)?;
        writeln!(buf, "* Stack")?;
        if self.cpu.sp == 0 {
            writeln!(buf, "Empty stack")?;
        } else {
            for i in (0..self.cpu.sp).rev() {
                writeln!(buf, "{i}: {:03X}", self.cpu.stack[i])?;
            }
        }

        Ok(buf)
    }

    /// The instruction at the program counter, without executing it.
    pub fn dump_next_op(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        let pc = self.cpu.pc as usize;

        match crate::bytecode::instr_at(&self.cpu.ram[..], pc) {
            Some(instr) => match Op::decode(instr) {
                Some(op) => write!(buf, "op: {instr:04X} at addr {pc:03X} ({op})")?,
                None => write!(buf, "op: {instr:04X} at addr {pc:03X} (unknown)")?,
            },
            None => write!(buf, "pc {pc:03X} is outside of memory")?,
        }

        Ok(buf)
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: Address, op: Op) {
    log::trace!("{pc:04X}: {op}");
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: Address, _: Op) {}
