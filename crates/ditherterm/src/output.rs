// SPDX-License-Identifier: MIT
//
// Output accumulation and color-run rendering for the text backend.
//
//   OutputBuffer — collects a whole frame in memory so the sink sees one
//   `write_all` per flush instead of one per escape.
//
//   RunWriter — remembers the last foreground and background it emitted and
//   only writes a new SGR when a cell's color differs. A row of forty red-on-
//   black cells costs one color pair and forty characters.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::Cell;
use crate::color::Color;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// In-memory frame accumulator, written to the real sink in one call.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 8_192;

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Sized for a grid of `cells` cells: one glyph plus a little slack for
    /// color changes each.
    #[must_use]
    pub fn for_cells(cells: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cells.saturating_mul(4).max(64)),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a character as UTF-8.
    #[inline]
    pub fn push_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Hand everything to `w` in a single write and empty the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails. The buffer keeps its
    /// contents in that case.
    pub fn flush_to<W: Write + ?Sized>(&mut self, w: &mut W) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RunWriter ───────────────────────────────────────────────────────────────

/// Color-run tracker. Writes into an [`OutputBuffer`], which cannot fail, so
/// escape writer results are discarded.
#[allow(clippy::struct_field_names)]
pub struct RunWriter {
    last_fg: Option<Color>,
    last_bg: Option<Color>,
}

impl RunWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }

    /// Emit both colors unconditionally and remember them.
    pub fn prime(&mut self, out: &mut OutputBuffer, fg: Color, bg: Color) {
        ansi::fg(out, fg).ok();
        ansi::bg(out, bg).ok();
        self.last_fg = Some(fg);
        self.last_bg = Some(bg);
    }

    /// Position the cursor at the start of a row. Colors carry over.
    pub fn begin_row(out: &mut OutputBuffer, x: u16, y: u16) {
        ansi::cursor_to(out, x, y).ok();
    }

    /// Emit one cell: changed colors first (foreground, then background),
    /// then the glyph.
    pub fn put(&mut self, out: &mut OutputBuffer, cell: &Cell) {
        if !self.last_fg.is_some_and(|c| same(c, cell.fg)) {
            ansi::fg(out, cell.fg).ok();
            self.last_fg = Some(cell.fg);
        }
        if !self.last_bg.is_some_and(|c| same(c, cell.bg)) {
            ansi::bg(out, cell.bg).ok();
            self.last_bg = Some(cell.bg);
        }
        out.push_char(cell.ch);
    }

    /// Terminate the frame with SGR 0 and forget the tracked colors.
    pub fn finish(&mut self, out: &mut OutputBuffer) {
        ansi::reset(out).ok();
        *self = Self::new();
    }
}

impl Default for RunWriter {
    fn default() -> Self {
        Self::new()
    }
}

// `Color::eq` converts its right operand into the left one's variant.
fn same(a: Color, b: Color) -> bool {
    a == b && b == a
}

// ─── Tests ───────────────────────────────────────────────────────────────────
