//! Display buffer.
//!
//! The buffer always has the physical size of the SUPER-CHIP high
//! resolution mode, 128x64, stored one byte per cell. In low resolution
//! mode the logical display is 64x32 and every logical pixel covers a 2x2
//! block of cells.
//!
//! Switching resolution does not touch the buffer, so content drawn in
//! one mode stays latent when the other mode is active.
use std::fmt::{self, Write};

use crate::constants::*;

/// Direction of a SUPER-CHIP scroll operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    Right,
    Left,
    Down,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Display {
    /// Pixel cells, either 0 or 1, row major.
    pub(crate) buffer: Box<[u8; DISPLAY_BUFFER_SIZE]>,
    /// High resolution mode.
    pub(crate) hires: bool,
    /// Set whenever the buffer changes, cleared by the host once presented.
    pub(crate) dirty: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            buffer: Box::new([0; DISPLAY_BUFFER_SIZE]),
            hires: false,
            dirty: false,
        }
    }
}

impl Display {
    pub fn new() -> Self {
        Default::default()
    }

    /// Physical cells, `DISPLAY_WIDTH` x `DISPLAY_HEIGHT`.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer[..]
    }

    pub fn is_high_resolution(&self) -> bool {
        self.hires
    }

    pub fn set_high_resolution(&mut self, hires: bool) {
        if self.hires != hires {
            log::debug!(
                "display switched to {} resolution",
                if hires { "high" } else { "low" }
            );
        }
        self.hires = hires;
    }

    /// Number of physical cells covered by one logical pixel along each axis.
    #[inline(always)]
    pub fn scale(&self) -> usize {
        if self.hires {
            1
        } else {
            2
        }
    }

    /// Logical `[width, height]` of the current resolution.
    #[inline]
    pub fn resolution(&self) -> [usize; 2] {
        if self.hires {
            DISPLAY_SIZE
        } else {
            [LORES_WIDTH, LORES_HEIGHT]
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Physical cell value.
    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.buffer[x + y * DISPLAY_WIDTH]
    }

    /// Logical pixel value in the current resolution.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let scale = self.scale();
        self.cell(x * scale, y * scale) != 0
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0);
        self.dirty = true;
    }

    /// Draw a sprite with its top left corner at logical coordinate `(x, y)`.
    ///
    /// The sprite is `row_bytes * 8` pixels wide, with one row per
    /// `row_bytes` bytes, most significant bit on the left. The base
    /// coordinate wraps around the display, but the sprite itself is
    /// clipped at the edges.
    ///
    /// Returns `true` when any cell was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8], row_bytes: usize) -> bool {
        let [width, height] = self.resolution();
        let scale = self.scale();
        let x0 = x as usize % width;
        let y0 = y as usize % height;
        let mut is_erased = false;

        for (r, row) in sprite.chunks_exact(row_bytes).enumerate() {
            let ly = y0 + r;
            if ly >= height {
                break;
            }

            for c in 0..row_bytes * 8 {
                let lx = x0 + c;
                if lx >= width {
                    break;
                }

                if (row[c / 8] >> (7 - c % 8)) & 1 != 0 {
                    is_erased |= self.flip(lx, ly, scale);
                }
            }
        }

        self.dirty = true;
        is_erased
    }

    /// XOR a logical pixel, which covers `scale` x `scale` cells.
    #[inline]
    fn flip(&mut self, lx: usize, ly: usize, scale: usize) -> bool {
        let mut is_erased = false;

        for dy in 0..scale {
            let row = (ly * scale + dy) * DISPLAY_WIDTH;
            for dx in 0..scale {
                let cell = &mut self.buffer[row + lx * scale + dx];
                // XOR erases a pixel when both the old and new values are both 1.
                is_erased |= *cell == 1;
                *cell ^= 1;
            }
        }

        is_erased
    }

    /// Shift the whole buffer by `cells` physical cells, filling the
    /// vacated area with blank cells.
    pub fn scroll(&mut self, direction: Scroll, cells: usize) {
        match direction {
            Scroll::Right => {
                let n = cells.min(DISPLAY_WIDTH);
                for row in self.buffer.chunks_exact_mut(DISPLAY_WIDTH) {
                    row.copy_within(..DISPLAY_WIDTH - n, n);
                    row[..n].fill(0);
                }
            }
            Scroll::Left => {
                let n = cells.min(DISPLAY_WIDTH);
                for row in self.buffer.chunks_exact_mut(DISPLAY_WIDTH) {
                    row.copy_within(n.., 0);
                    row[DISPLAY_WIDTH - n..].fill(0);
                }
            }
            Scroll::Down => {
                let n = cells.min(DISPLAY_HEIGHT) * DISPLAY_WIDTH;
                self.buffer.copy_within(..DISPLAY_BUFFER_SIZE - n, n);
                self.buffer[..n].fill(0);
            }
        }

        self.dirty = true;
    }

    /// Render the logical display as text, one line per row.
    pub fn dump(&self) -> Result<String, fmt::Error> {
        let [width, height] = self.resolution();
        let mut buf = String::with_capacity((width + 1) * height);

        for y in 0..height {
            for x in 0..width {
                if self.pixel(x, y) {
                    write!(buf, "#")?;
                } else {
                    write!(buf, ".")?;
                }
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lit_cells(display: &Display) -> Vec<(usize, usize)> {
        (0..DISPLAY_HEIGHT)
            .flat_map(|y| (0..DISPLAY_WIDTH).map(move |x| (x, y)))
            .filter(|(x, y)| display.cell(*x, *y) == 1)
            .collect()
    }

    #[test]
    fn test_draw_collision() {
        let mut display = Display::new();
        display.set_high_resolution(true);

        // Draw two sprites next to each other.
        // The zero bits of the second draw must not erase
        // the pixels of the first draw.
        assert!(!display.draw_sprite(4, 0, &[0b1111_0000], 1));
        assert!(!display.draw_sprite(0, 0, &[0b1111_0000], 1));
        assert_eq!(lit_cells(&display).len(), 8);

        // Overlapping draw erases and reports a collision.
        assert!(display.draw_sprite(2, 0, &[0b1000_0000], 1));
        assert_eq!(display.cell(2, 0), 0);
        assert!(display.is_dirty());
    }

    #[test]
    fn test_double_draw_restores_buffer() {
        let mut display = Display::new();
        display.set_high_resolution(true);
        display.draw_sprite(10, 10, &[0b1010_1010, 0b0101_0101], 1);
        let before = display.clone();

        let sprite = [0xFF, 0x81, 0xFF];
        let first = display.draw_sprite(9, 9, &sprite, 1);
        let second = display.draw_sprite(9, 9, &sprite, 1);

        assert!(first);
        assert!(second);
        assert_eq!(display.buffer(), before.buffer());
    }

    #[test]
    fn test_lores_block_draw() {
        let mut display = Display::new();
        assert!(!display.is_high_resolution());

        display.draw_sprite(1, 1, &[0b1000_0000], 1);

        assert_eq!(lit_cells(&display), vec![(2, 2), (3, 2), (2, 3), (3, 3)]);
        assert!(display.pixel(1, 1));
    }

    #[test]
    fn test_coordinates_wrap_sprite_clips() {
        let mut display = Display::new();
        display.set_high_resolution(true);

        // Base coordinate wraps around.
        display.draw_sprite(128 + 3, 64 + 2, &[0b1000_0000], 1);
        assert_eq!(display.cell(3, 2), 1);
        display.clear();

        // Sprite columns beyond the edge are dropped.
        display.draw_sprite(127, 0, &[0xFF], 1);
        assert_eq!(lit_cells(&display), vec![(127, 0)]);
        display.clear();

        // Sprite rows beyond the edge are dropped.
        display.draw_sprite(0, 63, &[0x80, 0x80, 0x80], 1);
        assert_eq!(lit_cells(&display), vec![(0, 63)]);
    }

    #[test]
    fn test_lores_clips_at_logical_edge() {
        let mut display = Display::new();

        display.draw_sprite(63, 31, &[0xFF, 0xFF], 1);

        assert_eq!(
            lit_cells(&display),
            vec![(126, 62), (127, 62), (126, 63), (127, 63)]
        );
    }

    #[test]
    fn test_wide_sprite() {
        let mut display = Display::new();
        display.set_high_resolution(true);

        display.draw_sprite(0, 0, &[0x80, 0x01, 0x00, 0x00], 2);

        assert_eq!(lit_cells(&display), vec![(0, 0), (15, 0)]);
    }

    #[test]
    fn test_scroll_right() {
        let mut display = Display::new();
        display.set_high_resolution(true);
        for y in 0..DISPLAY_HEIGHT as u8 {
            display.draw_sprite(0, y, &[0x80], 1);
        }

        display.scroll(Scroll::Right, 4);

        let lit = lit_cells(&display);
        assert_eq!(lit.len(), DISPLAY_HEIGHT);
        assert!(lit.iter().all(|(x, _)| *x == 4));
    }

    #[test]
    fn test_scroll_left_blanks_edge() {
        let mut display = Display::new();
        display.set_high_resolution(true);
        display.draw_sprite(120, 0, &[0xFF], 1);

        display.scroll(Scroll::Left, 4);

        assert_eq!(
            lit_cells(&display),
            (116..124).map(|x| (x, 0)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_scroll_down() {
        let mut display = Display::new();
        display.set_high_resolution(true);
        display.draw_sprite(0, 0, &[0x80], 1);
        display.draw_sprite(0, 63, &[0x80], 1);

        display.scroll(Scroll::Down, 0);
        assert_eq!(lit_cells(&display), vec![(0, 0), (0, 63)]);

        display.scroll(Scroll::Down, 1);
        assert_eq!(lit_cells(&display), vec![(0, 1)]);

        display.scroll(Scroll::Down, 100);
        assert!(lit_cells(&display).is_empty());
    }

    #[test]
    fn test_resolution_switch_keeps_buffer() {
        let mut display = Display::new();
        display.set_high_resolution(true);
        display.draw_sprite(5, 5, &[0x80], 1);

        display.set_high_resolution(false);
        assert_eq!(display.cell(5, 5), 1);
        display.set_high_resolution(true);
        assert_eq!(display.cell(5, 5), 1);
    }

    #[test]
    fn test_take_dirty() {
        let mut display = Display::new();
        assert!(!display.take_dirty());
        display.clear();
        assert!(display.take_dirty());
        assert!(!display.is_dirty());
    }

    #[test]
    fn test_dump_display() {
        let mut display = Display::new();
        display.draw_sprite(0, 0, &[0b1010_0000], 1);

        let dump = display.dump().unwrap();
        let first = dump.lines().next().unwrap();
        assert_eq!(first.len(), LORES_WIDTH);
        assert!(first.starts_with("#.#."));
        assert_eq!(dump.lines().count(), LORES_HEIGHT);
    }
}
