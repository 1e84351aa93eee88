//! IO device interface
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Hooks for a presentation surface driven by the host loop.
///
/// The interpreter never calls these itself; the host pushes the display
/// buffer and sound state, and pulls keyboard input once per cycle.
pub trait Surface {
    /// Blit the composed frame to screen output.
    ///
    /// The frame has `DISPLAY_WIDTH` x `DISPLAY_HEIGHT` cells, one byte per cell.
    fn present(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Turn the sound buzzer off or on.
    fn set_silent(&mut self, silent: bool);

    /// Checks immediately which key is currently pressed, along with
    /// any control signals.
    fn poll_input(&mut self) -> io::Result<KeyInput>;

    /// The user asked to close the surface.
    fn quit_requested(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyCode {
    Key0 = 0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF = 0xF,
}

impl KeyCode {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let key_id = self.as_u8();
        write!(f, "k{key_id:x}")
    }
}

impl From<KeyCode> for u8 {
    fn from(keycode: KeyCode) -> Self {
        keycode.as_u8()
    }
}

impl TryFrom<u8> for KeyCode {
    type Error = InvalidKeyCode;

    fn try_from(key_id: u8) -> Result<Self, Self::Error> {
        match key_id {
            0 => Ok(Self::Key0),
            1 => Ok(Self::Key1),
            2 => Ok(Self::Key2),
            3 => Ok(Self::Key3),
            4 => Ok(Self::Key4),
            5 => Ok(Self::Key5),
            6 => Ok(Self::Key6),
            7 => Ok(Self::Key7),
            8 => Ok(Self::Key8),
            9 => Ok(Self::Key9),
            10 => Ok(Self::KeyA),
            11 => Ok(Self::KeyB),
            12 => Ok(Self::KeyC),
            13 => Ok(Self::KeyD),
            14 => Ok(Self::KeyE),
            15 => Ok(Self::KeyF),
            _ => Err(InvalidKeyCode),
        }
    }
}

#[derive(Debug)]
pub struct InvalidKeyCode;

impl std::error::Error for InvalidKeyCode {}

impl std::fmt::Display for InvalidKeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "keycode must be in range 0 <= keycode < {KEY_COUNT}")
    }
}

/// Keyboard state for a single cycle, packed into one byte.
///
/// ```text
/// 0b0001_0000  a key is down
/// 0b0000_1111  which of the 16 keys is down
/// 0b0010_0000  request a save state
/// 0b0100_0000  request a load state
/// 0b1000_0000  request a full redraw
/// ```
///
/// At most one keypad key can be reported per cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput(pub u8);

impl KeyInput {
    pub const KEY_DOWN: u8 = 0x10;
    pub const KEY_MASK: u8 = 0x0F;
    pub const SAVE_STATE: u8 = 0x20;
    pub const LOAD_STATE: u8 = 0x40;
    pub const REDRAW: u8 = 0x80;

    /// No key is pressed and no control signal is raised.
    pub const NONE: KeyInput = KeyInput(0);

    /// The given keypad key is pressed.
    pub fn pressed(key: KeyCode) -> Self {
        Self(Self::KEY_DOWN | key.as_u8())
    }

    /// Raise additional control bits.
    pub fn with(self, control: u8) -> Self {
        Self(self.0 | (control & !(Self::KEY_DOWN | Self::KEY_MASK)))
    }

    /// Only the keypad bits, with the control signals dropped.
    pub fn keys(self) -> Self {
        Self(self.0 & (Self::KEY_DOWN | Self::KEY_MASK))
    }

    /// The keypad key that is down, if any.
    pub fn key(&self) -> Option<u8> {
        if self.0 & Self::KEY_DOWN != 0 {
            Some(self.0 & Self::KEY_MASK)
        } else {
            None
        }
    }

    /// Whether the given register value names the key that is down.
    ///
    /// Values above 0xF never match.
    pub fn is_down(&self, key: u8) -> bool {
        self.key() == Some(key)
    }

    pub fn save_requested(&self) -> bool {
        self.0 & Self::SAVE_STATE != 0
    }

    pub fn load_requested(&self) -> bool {
        self.0 & Self::LOAD_STATE != 0
    }

    pub fn redraw_requested(&self) -> bool {
        self.0 & Self::REDRAW != 0
    }
}

impl From<u8> for KeyInput {
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}

/// Persistent storage for the SUPER-CHIP RPL user flags.
pub trait FlagStore {
    /// Replace the stored flags with the given registers.
    fn store(&mut self, flags: &[u8]) -> io::Result<()>;

    /// Read stored flags into the given registers, returning how many were read.
    fn load(&mut self, flags: &mut [u8]) -> io::Result<usize>;
}

/// Flags kept in a file as raw bytes, without a header.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FlagStore for FileFlagStore {
    fn store(&mut self, flags: &[u8]) -> io::Result<()> {
        fs::write(&self.path, &flags[..flags.len().min(RPL_FLAG_COUNT)])
    }

    fn load(&mut self, flags: &mut [u8]) -> io::Result<usize> {
        let file = fs::File::open(&self.path)?;
        let mut buf = Vec::with_capacity(RPL_FLAG_COUNT);
        file.take(RPL_FLAG_COUNT as u64).read_to_end(&mut buf)?;

        let count = buf.len().min(flags.len());
        flags[..count].copy_from_slice(&buf[..count]);
        Ok(count)
    }
}

/// Flags kept in memory, lost when the store is dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryFlagStore {
    flags: Vec<u8>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn flags(&self) -> &[u8] {
        &self.flags
    }
}

impl FlagStore for MemoryFlagStore {
    fn store(&mut self, flags: &[u8]) -> io::Result<()> {
        self.flags.clear();
        self.flags
            .extend_from_slice(&flags[..flags.len().min(RPL_FLAG_COUNT)]);
        Ok(())
    }

    fn load(&mut self, flags: &mut [u8]) -> io::Result<usize> {
        let count = self.flags.len().min(flags.len());
        flags[..count].copy_from_slice(&self.flags[..count]);
        Ok(count)
    }
}

/// How consecutive frames are combined before presenting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum BufferingMode {
    /// Present each frame as is.
    Single,
    /// Merge each frame with the previous one, which hides the
    /// flicker of sprites being erased and redrawn.
    #[default]
    Double,
}

/// Composes display buffers into presentable frames.
pub struct FrameBlender {
    mode: BufferingMode,
    last_frame: Box<[u8; DISPLAY_BUFFER_SIZE]>,
    frame: Box<[u8; DISPLAY_BUFFER_SIZE]>,
}

impl FrameBlender {
    pub fn new(mode: BufferingMode) -> Self {
        Self {
            mode,
            last_frame: Box::new([0; DISPLAY_BUFFER_SIZE]),
            frame: Box::new([0; DISPLAY_BUFFER_SIZE]),
        }
    }

    pub fn mode(&self) -> BufferingMode {
        self.mode
    }

    /// Compose the display buffer into a frame.
    ///
    /// In double buffering mode a cell is lit when it is lit in either the
    /// given buffer or the previously composed one.
    pub fn compose(&mut self, display: &[u8]) -> &[u8] {
        debug_assert_eq!(display.len(), DISPLAY_BUFFER_SIZE);

        match self.mode {
            BufferingMode::Single => self.frame.copy_from_slice(display),
            BufferingMode::Double => {
                for ((out, prev), cell) in self
                    .frame
                    .iter_mut()
                    .zip(self.last_frame.iter())
                    .zip(display.iter())
                {
                    *out = *prev | *cell;
                }
            }
        }

        self.last_frame.copy_from_slice(display);
        &self.frame[..]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_input() {
        assert_eq!(KeyInput::NONE.key(), None);
        assert!(!KeyInput::NONE.is_down(0));

        let input = KeyInput::pressed(KeyCode::Key0);
        assert_eq!(input.0, 0x10);
        assert_eq!(input.key(), Some(0));
        assert!(input.is_down(0));
        assert!(!input.is_down(0x10));
        assert!(!input.is_down(1));

        // Control bits do not count as a key press.
        let input = KeyInput::NONE.with(KeyInput::SAVE_STATE | KeyInput::REDRAW);
        assert_eq!(input.key(), None);
        assert!(input.save_requested());
        assert!(!input.load_requested());
        assert!(input.redraw_requested());

        let input = KeyInput::pressed(KeyCode::KeyF).with(KeyInput::LOAD_STATE);
        assert_eq!(input.key(), Some(0xF));
        assert!(input.load_requested());
    }

    #[test]
    fn test_keycode_conversion() {
        assert_eq!(KeyCode::try_from(0xA).unwrap(), KeyCode::KeyA);
        assert!(KeyCode::try_from(16).is_err());
        assert_eq!(u8::from(KeyCode::Key7), 7);
        assert_eq!(KeyCode::KeyB.to_string(), "kb");
    }

    #[test]
    fn test_memory_flag_store() {
        let mut store = MemoryFlagStore::new();
        store.store(&[1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
        assert_eq!(store.flags(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        let mut flags = [0; 3];
        assert_eq!(store.load(&mut flags).unwrap(), 3);
        assert_eq!(flags, [1, 2, 3]);
    }

    #[test]
    fn test_file_flag_store() {
        let path = std::env::temp_dir().join(format!("chip8-rpl-{}.bin", std::process::id()));
        let mut store = FileFlagStore::new(&path);

        store.store(&[6, 7, 8, 9, 10]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![6, 7, 8, 9, 10]);

        // Storing again truncates the previous flags.
        store.store(&[1]).unwrap();
        let mut flags = [0xFF; 8];
        assert_eq!(store.load(&mut flags).unwrap(), 1);
        assert_eq!(flags[0], 1);
        assert_eq!(flags[1], 0xFF);

        fs::remove_file(&path).unwrap();
        assert!(store.load(&mut flags).is_err());
    }

    #[test]
    fn test_frame_blender() {
        let mut frame_a = vec![0; DISPLAY_BUFFER_SIZE];
        frame_a[0] = 1;
        let mut frame_b = vec![0; DISPLAY_BUFFER_SIZE];
        frame_b[1] = 1;

        let mut single = FrameBlender::new(BufferingMode::Single);
        single.compose(&frame_a);
        let out = single.compose(&frame_b);
        assert_eq!(&out[..2], &[0, 1]);

        let mut double = FrameBlender::new(BufferingMode::Double);
        double.compose(&frame_a);
        let out = double.compose(&frame_b);
        assert_eq!(&out[..2], &[1, 1]);
        let out = double.compose(&frame_b);
        assert_eq!(&out[..2], &[0, 1]);
    }
}
