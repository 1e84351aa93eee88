//! Terminal presentation surface.
use std::{
    io::{self, Stdout, Write},
    time::{Duration, Instant},
};

use chip8::{constants::DISPLAY_WIDTH, prelude::*};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode as TermKey, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Terminals only report key presses, so a key counts as held down
/// for this long after its last press or auto-repeat.
const KEY_HOLD: Duration = Duration::from_millis(150);

/// Keypad layout on the left hand side of a QWERTY keyboard.
///
/// ```text
/// 1 2 3 C    1 2 3 4
/// 4 5 6 D    Q W E R
/// 7 8 9 E    A S D F
/// A 0 B F    Z X C V
/// ```
///
/// When several keys arrive together, the earliest entry wins.
const KEYMAP: [(char, KeyCode); 16] = [
    ('1', KeyCode::Key1),
    ('2', KeyCode::Key2),
    ('3', KeyCode::Key3),
    ('4', KeyCode::KeyC),
    ('q', KeyCode::Key4),
    ('w', KeyCode::Key5),
    ('e', KeyCode::Key6),
    ('r', KeyCode::KeyD),
    ('a', KeyCode::Key7),
    ('s', KeyCode::Key8),
    ('d', KeyCode::Key9),
    ('f', KeyCode::KeyE),
    ('z', KeyCode::KeyA),
    ('x', KeyCode::Key0),
    ('c', KeyCode::KeyB),
    ('v', KeyCode::KeyF),
];

/// Position in the keymap, and the keypad key for a typed character.
fn map_key(c: char) -> Option<(usize, KeyCode)> {
    let c = c.to_ascii_lowercase();
    KEYMAP
        .iter()
        .position(|(mapped, _)| *mapped == c)
        .map(|index| (index, KEYMAP[index].1))
}

/// Draws the display with half block characters, two cell rows per line.
pub struct TermSurface {
    out: Stdout,
    scale: usize,
    held: Option<(KeyCode, Instant)>,
    controls: u8,
    quit: bool,
    silent: bool,
}

impl TermSurface {
    /// Switch the terminal to raw mode on the alternate screen.
    pub fn new(scale: usize) -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

        Ok(Self {
            out,
            scale: scale.max(1),
            held: None,
            controls: 0,
            quit: false,
            silent: true,
        })
    }

    fn handle_key(&mut self, code: TermKey, modifiers: KeyModifiers, pressed: &mut Option<usize>) {
        match code {
            TermKey::Esc => self.quit = true,
            TermKey::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
            TermKey::F(5) => self.controls |= KeyInput::SAVE_STATE,
            TermKey::F(9) => self.controls |= KeyInput::LOAD_STATE,
            TermKey::F(2) => self.controls |= KeyInput::REDRAW,
            TermKey::Char(c) => match map_key(c) {
                Some((index, _)) => {
                    *pressed = Some(pressed.map_or(index, |prev| prev.min(index)));
                }
                None => log::trace!("unmapped key {c:?}"),
            },
            _ => {}
        }
    }
}

impl Drop for TermSurface {
    fn drop(&mut self) {
        if let Err(err) = execute!(self.out, Show, LeaveAlternateScreen) {
            log::error!("failed to restore terminal screen: {err}");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("failed to disable raw mode: {err}");
        }
    }
}

impl Surface for TermSurface {
    fn present(&mut self, frame: &[u8]) -> io::Result<()> {
        for (row, line) in render_lines(frame, self.scale).iter().enumerate() {
            queue!(self.out, MoveTo(0, row as u16), Print(line))?;
        }
        self.out.flush()
    }

    fn set_silent(&mut self, silent: bool) {
        if self.silent && !silent {
            // Terminal bell, once per beep.
            if let Err(err) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
                log::debug!("failed to ring bell: {err}");
            }
        }
        self.silent = silent;
    }

    fn poll_input(&mut self) -> io::Result<KeyInput> {
        let mut pressed = None;

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key.code, key.modifiers, &mut pressed);
            }
        }

        if let Some(index) = pressed {
            self.held = Some((KEYMAP[index].1, Instant::now()));
        }

        let mut input = match self.held {
            Some((key, at)) if at.elapsed() < KEY_HOLD => KeyInput::pressed(key),
            _ => {
                self.held = None;
                KeyInput::NONE
            }
        };
        input = input.with(std::mem::take(&mut self.controls));

        Ok(input)
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// Render display cells as lines of text.
///
/// Each cell is `scale` characters wide and `scale` half lines high.
pub fn render_lines(frame: &[u8], scale: usize) -> Vec<String> {
    let scale = scale.max(1);
    let rows = frame
        .chunks_exact(DISPLAY_WIDTH)
        .flat_map(|row| std::iter::repeat(row).take(scale))
        .collect::<Vec<_>>();

    rows.chunks(2)
        .map(|pair| {
            let top = pair[0];
            let bottom = pair.get(1).copied();
            let mut line = String::with_capacity(DISPLAY_WIDTH * scale * 3);

            for x in 0..DISPLAY_WIDTH {
                let glyph = match (top[x] != 0, bottom.map_or(false, |row| row[x] != 0)) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                };
                for _ in 0..scale {
                    line.push(glyph);
                }
            }

            line
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use chip8::constants::{DISPLAY_BUFFER_SIZE, DISPLAY_HEIGHT};

    #[test]
    fn test_keymap() {
        assert_eq!(map_key('1'), Some((0, KeyCode::Key1)));
        assert_eq!(map_key('4'), Some((3, KeyCode::KeyC)));
        assert_eq!(map_key('X'), Some((13, KeyCode::Key0)));
        assert_eq!(map_key('v'), Some((15, KeyCode::KeyF)));
        assert_eq!(map_key('p'), None);
    }

    #[test]
    fn test_render_lines() {
        let mut frame = vec![0; DISPLAY_BUFFER_SIZE];
        frame[0] = 1;
        frame[DISPLAY_WIDTH + 1] = 1;
        frame[2] = 1;
        frame[DISPLAY_WIDTH + 2] = 1;

        let lines = render_lines(&frame, 1);
        assert_eq!(lines.len(), DISPLAY_HEIGHT / 2);
        assert!(lines[0].starts_with("▀▄█ "));
        assert_eq!(lines[0].chars().count(), DISPLAY_WIDTH);

        let lines = render_lines(&frame, 2);
        assert_eq!(lines.len(), DISPLAY_HEIGHT);
        assert!(lines[0].starts_with("██  ██  "));
        assert!(lines[1].starts_with("  ████  "));
    }
}
