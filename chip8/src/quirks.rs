//! Historically divergent interpreter behaviours.
//!
//! Early interpreters (COSMAC VIP, CHIP-48, SUPER-CHIP) disagree on a
//! handful of opcodes. Each toggle selects the legacy behaviour when set;
//! the default is the modern behaviour for every opcode.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Quirks {
    /// `8XY6`/`8XYE` copy VY into VX before shifting, instead of shifting VX in place.
    pub legacy_shift: bool,
    /// `BNNN` jumps to `NNN + V0`, instead of `XNN + VX`.
    pub legacy_jump_offset: bool,
    /// `FX55`/`FX65` leave I pointing past the last register transferred.
    pub legacy_index_increment: bool,
    /// SUPER-CHIP 1.1 scroll amounts are not doubled in low resolution mode.
    pub legacy_scroll: bool,
}

impl Quirks {
    pub const LEGACY_SHIFT: u8 = 0x1;
    pub const LEGACY_JUMP_OFFSET: u8 = 0x2;
    pub const LEGACY_INDEX_INCREMENT: u8 = 0x4;
    pub const LEGACY_SCROLL: u8 = 0x8;

    /// Modern behaviour for every opcode.
    pub const MODERN: Quirks = Quirks {
        legacy_shift: false,
        legacy_jump_offset: false,
        legacy_index_increment: false,
        legacy_scroll: false,
    };

    /// Legacy behaviour for every opcode.
    pub const LEGACY: Quirks = Quirks {
        legacy_shift: true,
        legacy_jump_offset: true,
        legacy_index_increment: true,
        legacy_scroll: true,
    };

    /// Pack the toggles into a bitset, used by save states.
    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.legacy_shift {
            bits |= Self::LEGACY_SHIFT;
        }
        if self.legacy_jump_offset {
            bits |= Self::LEGACY_JUMP_OFFSET;
        }
        if self.legacy_index_increment {
            bits |= Self::LEGACY_INDEX_INCREMENT;
        }
        if self.legacy_scroll {
            bits |= Self::LEGACY_SCROLL;
        }
        bits
    }

    /// Unpack a bitset. Unknown bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            legacy_shift: bits & Self::LEGACY_SHIFT != 0,
            legacy_jump_offset: bits & Self::LEGACY_JUMP_OFFSET != 0,
            legacy_index_increment: bits & Self::LEGACY_INDEX_INCREMENT != 0,
            legacy_scroll: bits & Self::LEGACY_SCROLL != 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_quirk_bits() {
        assert_eq!(Quirks::MODERN.bits(), 0x0);
        assert_eq!(Quirks::LEGACY.bits(), 0xF);
        assert_eq!(Quirks::default(), Quirks::MODERN);

        let quirks = Quirks {
            legacy_jump_offset: true,
            legacy_scroll: true,
            ..Quirks::MODERN
        };
        assert_eq!(quirks.bits(), 0b1010);
        assert_eq!(Quirks::from_bits(0b1010), quirks);
        assert_eq!(Quirks::from_bits(0xF0), Quirks::MODERN);
    }
}
