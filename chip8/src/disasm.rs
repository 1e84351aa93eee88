//! Disassembler.
use std::fmt::{self, Write as FmtWrite};

use crate::{bytecode::instr_at, constants::MEM_START, op::Op};

/// Produces an assembly listing from program bytecode.
///
/// Programs mix data with code, and nothing marks which is which, so every
/// aligned word is decoded. Words that are not instructions are listed as
/// raw data.
pub struct Disassembler<'a> {
    bytecode: &'a [u8],
    origin: usize,
}

impl<'a> Disassembler<'a> {
    pub fn new(bytecode: &'a [u8]) -> Self {
        Self {
            bytecode,
            origin: MEM_START,
        }
    }

    /// Address the first byte is loaded at.
    pub fn with_origin(mut self, origin: usize) -> Self {
        self.origin = origin;
        self
    }

    /// Write the listing of the whole program to the given writer.
    pub fn disassemble<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        let mut cursor = 0;

        while cursor < self.bytecode.len() {
            let addr = self.origin + cursor;
            match instr_at(self.bytecode, cursor) {
                Some(instr) => match Op::decode(instr) {
                    Some(op) => writeln!(w, "{addr:04X}: {instr:04X}  {op}")?,
                    None => writeln!(w, "{addr:04X}: {instr:04X}  DW 0x{instr:04X}")?,
                },
                // Odd trailing byte.
                None => {
                    let byte = self.bytecode[cursor];
                    writeln!(w, "{addr:04X}: {byte:02X}    DB 0x{byte:02X}")?
                }
            }
            cursor += 2;
        }

        Ok(())
    }

    pub fn listing(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        self.disassemble(&mut buf)?;
        Ok(buf)
    }
}
