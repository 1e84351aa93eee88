//! Helpers for extracting data from opcodes.
//!
//! Each instruction is two bytes, big endian, split into four nibbles:
//!
//! ```text
//! 0xF000  op code
//! 0x0F00  X register
//! 0x00F0  Y register
//! 0x000F  N
//! 0x00FF  NN
//! 0x0FFF  NNN
//! ```

/// Read the instruction word from the buffer at the cursor.
///
/// Returns `None` when the instruction would extend past the end of the buffer.
#[inline(always)]
pub fn instr_at(bytecode: &[u8], cursor: usize) -> Option<u16> {
    match (bytecode.get(cursor), bytecode.get(cursor.wrapping_add(1))) {
        (Some(a), Some(b)) => Some(((*a as u16) << 8) | *b as u16),
        _ => None,
    }
}

/// Extract opcode identity from the first nibble.
#[inline(always)]
pub fn op_code(instr: u16) -> u8 {
    ((instr & 0xF000) >> 12) as u8
}

/// Extract operand VX.
#[inline(always)]
pub fn op_x(instr: u16) -> u8 {
    ((instr & 0x0F00) >> 8) as u8
}

/// Extract operand VY.
#[inline(always)]
pub fn op_y(instr: u16) -> u8 {
    ((instr & 0x00F0) >> 4) as u8
}

/// Extract operand N.
#[inline(always)]
pub fn op_n(instr: u16) -> u8 {
    (instr & 0x000F) as u8
}

/// Extract operand NN.
#[inline(always)]
pub fn op_nn(instr: u16) -> u8 {
    (instr & 0x00FF) as u8
}

/// Extract operand NNN.
#[inline(always)]
pub fn op_nnn(instr: u16) -> u16 {
    instr & 0x0FFF
}
