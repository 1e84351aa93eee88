//! Constant values of the Chip-8 architecture.
use std::time::Duration;

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 0x10; // 16

/// Index of the flag register VF, overwritten by arithmetic, shift and draw instructions.
pub const FLAG_REGISTER: usize = 0xF;

/// The lower memory space was historically used for the interpreter itself,
/// but is now used for fonts.
pub const MEM_START: usize = 0x200; // 512
pub const MEM_SIZE: usize = 0x1000; // 4096

/// Largest program that fits between `MEM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEM_SIZE - MEM_START;

/// Mask applied when the index register wraps around.
pub const ADDRESS_MASK: u16 = (MEM_SIZE - 1) as u16;

/// Levels of nesting allowed in the call stack.
pub const STACK_SIZE: usize = 16;

/// Start of the low resolution font, 16 glyphs of 5 bytes each.
pub const FONTSET_START: u16 = 0x50;
pub const FONTSET_HEIGHT: usize = 5;
pub const FONTSET_DATA_LENGTH: usize = 16 * FONTSET_HEIGHT;

/// Start of the SUPER-CHIP large font, 16 glyphs of 10 bytes each.
///
/// Placed directly after the low resolution font, so the whole font
/// region ends at `0x140`.
pub const LARGE_FONTSET_START: u16 = FONTSET_START + FONTSET_DATA_LENGTH as u16;
pub const LARGE_FONTSET_HEIGHT: usize = 10;
pub const LARGE_FONTSET_DATA_LENGTH: usize = 16 * LARGE_FONTSET_HEIGHT;

/// Physical size of the display buffer, which is the high resolution mode.
pub const DISPLAY_WIDTH: usize = 128;
pub const DISPLAY_HEIGHT: usize = 64;
pub const DISPLAY_SIZE: [usize; 2] = [DISPLAY_WIDTH, DISPLAY_HEIGHT];
pub const DISPLAY_BUFFER_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// Logical size of the display in low resolution mode.
///
/// Each logical pixel covers a 2x2 block of the physical buffer.
pub const LORES_WIDTH: usize = 64;
pub const LORES_HEIGHT: usize = 32;

/// Number of clock cycles in a second that delay timers count down.
pub const DELAY_FREQUENCY: u64 = 60;

/// Number of nanoseconds in a second
#[doc(hidden)]
pub const NANOS_IN_SECOND: u64 = 1_000_000_000;

/// Time in nanoseconds a single timer tick takes, precalculated.
pub const CLOCK_CYCLE_TIME: u64 = NANOS_IN_SECOND / DELAY_FREQUENCY;

/// Interval between timer ticks.
pub const TIMER_PERIOD: Duration = Duration::from_nanos(CLOCK_CYCLE_TIME);

/// Instruction rate the host should aim for when none is configured.
pub const DEFAULT_CLOCK_FREQUENCY: u64 = 700;

/// Number of keys ob the keyboard (0x0-0xF)
pub const KEY_COUNT: u8 = 16;

/// Number of registers the SUPER-CHIP RPL user flags can hold (V0-V7).
pub const RPL_FLAG_COUNT: usize = 8;

/// Default file for save states.
pub const STATE_FILE_NAME: &str = "ch8-state.bin";

/// Default file for the SUPER-CHIP RPL user flags.
pub const RPL_FILE_NAME: &str = "rpl-flags.bin";

/// Type for storing the 12-bit memory addresses.
pub type Address = u16;
