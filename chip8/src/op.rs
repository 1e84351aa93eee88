//! Decoded instructions.
//!
//! The interpreter decodes each fetched instruction word into an [`Op`]
//! before executing it. The same representation is used by the
//! disassembler and instruction tracing.
use std::fmt::{self, Formatter};

use crate::{bytecode::*, constants::Address};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum Op {
    /// 00E0 (CLS)
    ///
    /// Clear the screen.
    ClearScreen,
    /// 00EE (RET)
    ///
    /// Return from the sub-routine.
    Return,
    /// 00CN (SCD nibble)
    ///
    /// SUPER-CHIP 1.1: Scroll the display down by `n` pixels.
    ScrollDown { n: u8 },
    /// 00FB (SCR)
    ///
    /// SUPER-CHIP 1.1: Scroll the display right by 4 pixels.
    ScrollRight,
    /// 00FC (SCL)
    ///
    /// SUPER-CHIP 1.1: Scroll the display left by 4 pixels.
    ScrollLeft,
    /// 00FD (EXIT)
    ///
    /// SUPER-CHIP 1.0: Exit the interpreter.
    Exit,
    /// 00FE (LOW)
    ///
    /// SUPER-CHIP 1.0: Switch to low resolution mode.
    LowRes,
    /// 00FF (HIGH)
    ///
    /// SUPER-CHIP 1.0: Switch to high resolution mode.
    HighRes,
    /// 1nnn (JP addr)
    ///
    /// Jump to the address in `nnn`.
    JumpAddress { address: Address },
    /// 2nnn (CALL addr)
    ///
    /// Call the sub-routine at address `nnn`.
    Call { address: Address },
    /// 3xnn (SE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` equals value `nn`
    Skip_Eq_Byte { vx: u8, nn: u8 },
    /// 4xnn (SNE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` does not equal value `nn`.
    Skip_NotEq_Byte { vx: u8, nn: u8 },
    /// 5xy0 (SE Vx, Vy)
    ///
    /// Skip the next instruction if register `Vx` equals register `Vy`.
    Skip_Eq { vx: u8, vy: u8 },
    /// 6xnn (LD Vx, byte)
    Load_Byte { vx: u8, nn: u8 },
    /// 7xnn (ADD Vx, byte)
    ///
    /// Add byte to the value in register `Vx`, store the result in `Vx`.
    /// Carry flag is not set.
    Add_Byte { vx: u8, nn: u8 },

    // ------------------------------------------------------------------------
    // Math
    /// 8xy0 (LD Vx, Vy)
    Load_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy1 (OR Vx, Vy)
    Or_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy2 (AND Vx, Vy)
    And_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy3 (XOR Vx, Vy)
    Xor_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy4 (ADD Vx, Vy)
    ///
    /// If overflowed, set VF to 1, else 0.
    Add_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy5 (SUB Vx, Vy)
    ///
    /// VF is set to 0 when there is a borrow, set to 1 when there isn't.
    Sub_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy6 (SHR Vx {, Vy})
    ShiftRight { vx: u8, vy: u8 },
    /// 8xy7 (SUBN Vx, Vy)
    ///
    /// Subtracts VX from VY, and stores the result in VX.
    SubReverse_Vx_Vy { vx: u8, vy: u8 },
    /// 8xyE (SHL Vx {, Vy})
    ShiftLeft { vx: u8, vy: u8 },

    /// 9xy0 (SNE Vx, Vy)
    Skip_NotEq { vx: u8, vy: u8 },
    /// Annn (LD I, addr)
    ///
    /// Load address into register `I`.
    Load_Address { address: Address },
    /// Bnnn (JP V0, addr)
    ///
    /// Jump to location nnn plus an offset register.
    Jump_Offset { vx: u8, address: Address },
    /// Cxnn (RND Vx, byte)
    ///
    /// Generate random number.
    Random { vx: u8, nn: u8 },
    /// Dxyn (DRW Vx, Vy, nibble)
    ///
    /// Draw sprite to the display buffer. A height of zero draws
    /// a 16x16 SUPER-CHIP sprite.
    Draw { vx: u8, vy: u8, n: u8 },

    // ------------------------------------------------------------------------
    // Keyboard
    /// Ex9E (SKP Vx)
    Skip_Key { vx: u8 },
    /// ExA1 (SKNP Vx)
    Skip_NotKey { vx: u8 },

    // ------------------------------------------------------------------------
    // Miscellaneous
    /// Fx07 (LD Vx, DT)
    Load_Vx_Delay { vx: u8 },
    /// Fx0A (LD Vx, K)
    ///
    /// Wait for a key press, store the value of the key in Vx.
    Load_Vx_Key { vx: u8 },
    /// Fx15 (LD DT, Vx)
    Load_Delay_Vx { vx: u8 },
    /// Fx18 (LD ST, Vx)
    Load_Sound_Vx { vx: u8 },
    /// Fx1E (ADD I, Vx)
    Add_Address_Vx { vx: u8 },
    /// Fx29 (LD F, Vx)
    Load_Glyph { vx: u8 },
    /// Fx30 (LD HF, Vx)
    ///
    /// SUPER-CHIP 1.1: Point I at the large glyph for digit Vx.
    Load_LargeGlyph { vx: u8 },
    /// Fx33 (LD B, Vx)
    Store_Bcd { vx: u8 },
    /// Fx55 (LD [I], Vx)
    Store_Registers { vx: u8 },
    /// Fx65 (LD Vx, [I])
    Load_Registers { vx: u8 },
    /// Fx75 (LD R, Vx)
    ///
    /// SUPER-CHIP 1.0: Store V0..Vx in the RPL user flags.
    Store_Flags { vx: u8 },
    /// Fx85 (LD Vx, R)
    ///
    /// SUPER-CHIP 1.0: Read V0..Vx from the RPL user flags.
    Load_Flags { vx: u8 },
}

impl Op {
    /// Decode an instruction word.
    ///
    /// Returns `None` for encodings that are not part of the instruction set.
    pub fn decode(instr: u16) -> Option<Op> {
        let vx = op_x(instr);
        let vy = op_y(instr);
        let n = op_n(instr);
        let nn = op_nn(instr);
        let address = op_nnn(instr);

        let op = match op_code(instr) {
            0x0 => match instr {
                0x00E0 => Op::ClearScreen,
                0x00EE => Op::Return,
                0x00FB => Op::ScrollRight,
                0x00FC => Op::ScrollLeft,
                0x00FD => Op::Exit,
                0x00FE => Op::LowRes,
                0x00FF => Op::HighRes,
                _ if instr & 0xFFF0 == 0x00C0 => Op::ScrollDown { n },
                _ => return None,
            },
            0x1 => Op::JumpAddress { address },
            0x2 => Op::Call { address },
            0x3 => Op::Skip_Eq_Byte { vx, nn },
            0x4 => Op::Skip_NotEq_Byte { vx, nn },
            0x5 if n == 0 => Op::Skip_Eq { vx, vy },
            0x6 => Op::Load_Byte { vx, nn },
            0x7 => Op::Add_Byte { vx, nn },
            0x8 => match n {
                0x0 => Op::Load_Vx_Vy { vx, vy },
                0x1 => Op::Or_Vx_Vy { vx, vy },
                0x2 => Op::And_Vx_Vy { vx, vy },
                0x3 => Op::Xor_Vx_Vy { vx, vy },
                0x4 => Op::Add_Vx_Vy { vx, vy },
                0x5 => Op::Sub_Vx_Vy { vx, vy },
                0x6 => Op::ShiftRight { vx, vy },
                0x7 => Op::SubReverse_Vx_Vy { vx, vy },
                0xE => Op::ShiftLeft { vx, vy },
                _ => return None,
            },
            0x9 if n == 0 => Op::Skip_NotEq { vx, vy },
            0xA => Op::Load_Address { address },
            0xB => Op::Jump_Offset { vx, address },
            0xC => Op::Random { vx, nn },
            0xD => Op::Draw { vx, vy, n },
            0xE => match nn {
                0x9E => Op::Skip_Key { vx },
                0xA1 => Op::Skip_NotKey { vx },
                _ => return None,
            },
            0xF => match nn {
                0x07 => Op::Load_Vx_Delay { vx },
                0x0A => Op::Load_Vx_Key { vx },
                0x15 => Op::Load_Delay_Vx { vx },
                0x18 => Op::Load_Sound_Vx { vx },
                0x1E => Op::Add_Address_Vx { vx },
                0x29 => Op::Load_Glyph { vx },
                0x30 => Op::Load_LargeGlyph { vx },
                0x33 => Op::Store_Bcd { vx },
                0x55 => Op::Store_Registers { vx },
                0x65 => Op::Load_Registers { vx },
                0x75 => Op::Store_Flags { vx },
                0x85 => Op::Load_Flags { vx },
                _ => return None,
            },
            _ => return None,
        };

        Some(op)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Op::ClearScreen => write!(f, "CLS"),
            Op::Return => write!(f, "RET"),
            Op::ScrollDown { n } => write!(f, "SCD {n}"),
            Op::ScrollRight => write!(f, "SCR"),
            Op::ScrollLeft => write!(f, "SCL"),
            Op::Exit => write!(f, "EXIT"),
            Op::LowRes => write!(f, "LOW"),
            Op::HighRes => write!(f, "HIGH"),
            Op::JumpAddress { address } => write!(f, "JP 0x{address:03X}"),
            Op::Call { address } => write!(f, "CALL 0x{address:03X}"),
            Op::Skip_Eq_Byte { vx, nn } => write!(f, "SE v{vx:X}, {nn}"),
            Op::Skip_NotEq_Byte { vx, nn } => write!(f, "SNE v{vx:X}, {nn}"),
            Op::Skip_Eq { vx, vy } => write!(f, "SE v{vx:X}, v{vy:X}"),
            Op::Load_Byte { vx, nn } => write!(f, "LD v{vx:X}, {nn}"),
            Op::Add_Byte { vx, nn } => write!(f, "ADD v{vx:X}, {nn}"),
            // ------
            Op::Load_Vx_Vy { vx, vy } => write!(f, "LD v{vx:X}, v{vy:X}"),
            Op::Or_Vx_Vy { vx, vy } => write!(f, "OR v{vx:X}, v{vy:X}"),
            Op::And_Vx_Vy { vx, vy } => write!(f, "AND v{vx:X}, v{vy:X}"),
            Op::Xor_Vx_Vy { vx, vy } => write!(f, "XOR v{vx:X}, v{vy:X}"),
            Op::Add_Vx_Vy { vx, vy } => write!(f, "ADD v{vx:X}, v{vy:X}"),
            Op::Sub_Vx_Vy { vx, vy } => write!(f, "SUB v{vx:X}, v{vy:X}"),
            Op::ShiftRight { vx, vy } => write!(f, "SHR v{vx:X}, v{vy:X}"),
            Op::SubReverse_Vx_Vy { vx, vy } => write!(f, "SUBN v{vx:X}, v{vy:X}"),
            Op::ShiftLeft { vx, vy } => write!(f, "SHL v{vx:X}, v{vy:X}"),
            // ------
            Op::Skip_NotEq { vx, vy } => write!(f, "SNE v{vx:X}, v{vy:X}"),
            Op::Load_Address { address } => write!(f, "LD I, 0x{address:03X}"),
            Op::Jump_Offset { address, .. } => write!(f, "JP v0, 0x{address:03X}"),
            Op::Random { vx, nn } => write!(f, "RND v{vx:X}, {nn}"),
            Op::Draw { vx, vy, n } => write!(f, "DRW v{vx:X}, v{vy:X}, {n}"),
            Op::Skip_Key { vx } => write!(f, "SKP v{vx:X}"),
            Op::Skip_NotKey { vx } => write!(f, "SKNP v{vx:X}"),
            // ------
            Op::Load_Vx_Delay { vx } => write!(f, "LD v{vx:X}, DT"),
            Op::Load_Vx_Key { vx } => write!(f, "LD v{vx:X}, K"),
            Op::Load_Delay_Vx { vx } => write!(f, "LD DT, v{vx:X}"),
            Op::Load_Sound_Vx { vx } => write!(f, "LD ST, v{vx:X}"),
            Op::Add_Address_Vx { vx } => write!(f, "ADD I, v{vx:X}"),
            Op::Load_Glyph { vx } => write!(f, "LD F, v{vx:X}"),
            Op::Load_LargeGlyph { vx } => write!(f, "LD HF, v{vx:X}"),
            Op::Store_Bcd { vx } => write!(f, "LD B, v{vx:X}"),
            Op::Store_Registers { vx } => write!(f, "LD [I], v{vx:X}"),
            Op::Load_Registers { vx } => write!(f, "LD v{vx:X}, [I]"),
            Op::Store_Flags { vx } => write!(f, "LD R, v{vx:X}"),
            Op::Load_Flags { vx } => write!(f, "LD v{vx:X}, R"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_super_chip() {
        assert_eq!(Op::decode(0x00C3), Some(Op::ScrollDown { n: 3 }));
        assert_eq!(Op::decode(0x00FB), Some(Op::ScrollRight));
        assert_eq!(Op::decode(0x00FC), Some(Op::ScrollLeft));
        assert_eq!(Op::decode(0x00FD), Some(Op::Exit));
        assert_eq!(Op::decode(0x00FE), Some(Op::LowRes));
        assert_eq!(Op::decode(0x00FF), Some(Op::HighRes));
        assert_eq!(Op::decode(0xF530), Some(Op::Load_LargeGlyph { vx: 5 }));
        assert_eq!(Op::decode(0xF775), Some(Op::Store_Flags { vx: 7 }));
    }

    #[test]
    fn test_decode_operands() {
        assert_eq!(
            Op::decode(0xB2F0),
            Some(Op::Jump_Offset {
                vx: 0x2,
                address: 0x2F0
            })
        );
        assert_eq!(
            Op::decode(0x8AB6),
            Some(Op::ShiftRight { vx: 0xA, vy: 0xB })
        );
        assert_eq!(Op::decode(0xD01F), Some(Op::Draw { vx: 0, vy: 1, n: 0xF }));
    }

    #[test]
    fn test_decode_unknown() {
        assert_eq!(Op::decode(0x0000), None);
        assert_eq!(Op::decode(0x0123), None);
        assert_eq!(Op::decode(0x5121), None);
        assert_eq!(Op::decode(0x8008), None);
        assert_eq!(Op::decode(0x9121), None);
        assert_eq!(Op::decode(0xE1FF), None);
        assert_eq!(Op::decode(0xF1FF), None);
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Op::ClearScreen.to_string(), "CLS");
        assert_eq!(
            Op::decode(0xA2F0).map(|op| op.to_string()).as_deref(),
            Some("LD I, 0x2F0")
        );
        assert_eq!(
            Op::decode(0x8AB4).map(|op| op.to_string()).as_deref(),
            Some("ADD vA, vB")
        );
    }
}
