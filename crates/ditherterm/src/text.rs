// SPDX-License-Identifier: MIT
//
// Text backend: a `Cell` grid serialized as an escape-sequence stream.
//
// Flush layout:
//
//   fg(cell 0,0) bg(cell 0,0)
//   for each row:   CUP(off_x, off_y + row)
//     for each cell:  [fg if changed] [bg if changed] glyph
//   SGR 0
//
// Every row gets its own cursor move, so a buffer can be composited anywhere
// on the screen, not only flush against the left edge. The frame is assembled
// in an `OutputBuffer` first and handed to the sink in a single write.

use std::io::Write;

use log::{debug, trace};

use crate::buffer::{ColorDepth, Flush, FrameBuffer, Grid};
use crate::cell::Cell;
use crate::color::Color;
use crate::error::Result;
use crate::output::{OutputBuffer, RunWriter};

/// Escape-sequence frame buffer for every color depth.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    grid: Grid<Cell>,
    depth: ColorDepth,
}

impl TextBuffer {
    /// A blank `width × height` buffer storing colors at `depth`.
    ///
    /// # Errors
    ///
    /// [`Error::Dimension`](crate::Error::Dimension) if either dimension is
    /// zero.
    pub fn new(width: u16, height: u16, depth: ColorDepth) -> Result<Self> {
        let grid = Grid::new(width, height, depth.blank())?;
        debug!("text buffer {width}x{height} ({depth:?})");
        Ok(Self { grid, depth })
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        (0..self.grid.height()).filter_map(|y| self.grid.row(y))
    }

    /// Assemble the full frame for device position `(x, y)` without writing
    /// it anywhere.
    #[must_use]
    pub fn render(&self, x: u16, y: u16) -> OutputBuffer {
        let mut out = OutputBuffer::for_cells(self.grid.total_cells());
        let mut runs = RunWriter::new();

        if let Some(first) = self.grid.cells().first() {
            runs.prime(&mut out, first.fg, first.bg);
        }
        for (row, cells) in self.rows().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let row = row as u16;
            RunWriter::begin_row(&mut out, x, y.saturating_add(row));
            for cell in cells {
                runs.put(&mut out, cell);
            }
        }
        runs.finish(&mut out);
        out
    }
}

impl FrameBuffer for TextBuffer {
    fn width(&self) -> u16 {
        self.grid.width()
    }

    fn height(&self) -> u16 {
        self.grid.height()
    }

    fn depth(&self) -> ColorDepth {
        self.depth
    }

    fn cell(&self, x: u16, y: u16) -> Result<Cell> {
        self.grid.get(x, y)
    }

    fn set_char(&mut self, x: u16, y: u16, ch: char) -> Result<()> {
        self.grid.get_mut(x, y)?.ch = ch;
        Ok(())
    }

    fn set_foreground(&mut self, x: u16, y: u16, color: impl Into<Color>) -> Result<()> {
        let fg = self.depth.normalize(color.into());
        self.grid.get_mut(x, y)?.fg = fg;
        Ok(())
    }

    fn set_background(&mut self, x: u16, y: u16, color: impl Into<Color>) -> Result<()> {
        let bg = self.depth.normalize(color.into());
        self.grid.get_mut(x, y)?.bg = bg;
        Ok(())
    }

    fn set_point(
        &mut self,
        x: u16,
        y: u16,
        ch: char,
        fg: impl Into<Color>,
        bg: impl Into<Color>,
    ) -> Result<()> {
        let cell = Cell::new(
            ch,
            self.depth.normalize(fg.into()),
            self.depth.normalize(bg.into()),
        );
        *self.grid.get_mut(x, y)? = cell;
        Ok(())
    }

    fn clear_with(&mut self, ch: char, fg: impl Into<Color>, bg: impl Into<Color>) {
        let cell = Cell::new(
            ch,
            self.depth.normalize(fg.into()),
            self.depth.normalize(bg.into()),
        );
        self.grid.fill(cell);
    }
}

impl Flush for TextBuffer {
    type Sink<'s> = dyn Write + 's;

    fn flush_at(&self, sink: &mut Self::Sink<'_>, x: u16, y: u16) -> Result<()> {
        let mut out = self.render(x, y);
        trace!(
            "text flush {}x{} at ({x}, {y}): {} bytes",
            self.width(),
            self.height(),
            out.len()
        );
        out.flush_to(sink)?;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Ansi16, Rgb8};
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn flushed(buf: &TextBuffer, x: u16, y: u16) -> String {
        let mut sink: Vec<u8> = Vec::new();
        buf.flush_at(&mut sink, x, y).unwrap();
        String::from_utf8(sink).unwrap()
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            TextBuffer::new(0, 3, ColorDepth::Ansi16),
            Err(Error::Dimension { width: 0, height: 3 })
        ));
    }

    #[test]
    fn new_buffer_is_blank() {
        let buf = TextBuffer::new(3, 2, ColorDepth::Ansi16).unwrap();
        assert_eq!(buf.cell(2, 1).unwrap(), Cell::BLANK);
    }

    // ── Mutation ────────────────────────────────────────────────────────

    #[test]
    fn colors_are_normalized_to_depth() {
        let mut buf = TextBuffer::new(2, 1, ColorDepth::TrueColor).unwrap();
        buf.set_foreground(0, 0, Color::rgb(1.0, 0.0, 0.0)).unwrap();
        buf.set_background(0, 0, Color::BLUE).unwrap();
        let cell = buf.cell(0, 0).unwrap();
        assert!(matches!(cell.fg, Color::Indexed24(Rgb8 { r: 255, g: 0, b: 0 })));
        assert!(matches!(cell.bg, Color::Indexed24(Rgb8 { r: 0, g: 0, b: 128 })));
    }

    #[test]
    fn set_point_writes_all_three() {
        let mut buf = TextBuffer::new(2, 2, ColorDepth::Ansi16).unwrap();
        buf.set_point(1, 1, '#', Ansi16::Yellow, Color::rgb(0.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(
            buf.cell(1, 1).unwrap(),
            Cell::new('#', Color::YELLOW, Color::BLACK)
        );
    }

    #[test]
    fn clear_with_then_clear() {
        let mut buf = TextBuffer::new(2, 2, ColorDepth::Ansi256).unwrap();
        buf.clear_with('.', Color::RED, Color::GREEN);
        let cell = buf.cell(1, 0).unwrap();
        assert_eq!(cell.ch, '.');
        assert!(matches!(cell.fg, Color::Indexed8(_)));
        buf.clear();
        assert_eq!(buf.cell(1, 0).unwrap(), ColorDepth::Ansi256.blank());
    }

    #[cfg(feature = "bounds-check")]
    #[test]
    fn setters_check_bounds() {
        let mut buf = TextBuffer::new(2, 2, ColorDepth::Ansi16).unwrap();
        assert!(matches!(buf.set_char(2, 0, 'x'), Err(Error::Bounds { .. })));
        assert!(matches!(
            buf.set_foreground(0, 2, Color::RED),
            Err(Error::Bounds { .. })
        ));
        assert!(buf.cell(5, 5).is_err());
    }

    // ── Flush ───────────────────────────────────────────────────────────

    #[test]
    fn flush_layout_for_blank_buffer() {
        let buf = TextBuffer::new(2, 2, ColorDepth::Ansi16).unwrap();
        assert_eq!(
            flushed(&buf, 0, 0),
            "\x1b[37m\x1b[40m\x1b[1;1H  \x1b[2;1H  \x1b[0m"
        );
    }

    #[test]
    fn flush_through_borrowed_trait_object() {
        let buf = TextBuffer::new(1, 1, ColorDepth::Ansi16).unwrap();
        let mut bytes: Vec<u8> = Vec::new();
        {
            let sink: &mut dyn Write = &mut bytes;
            buf.flush(sink).unwrap();
        }
        assert_eq!(bytes, b"\x1b[37m\x1b[40m\x1b[1;1H \x1b[0m");
    }

    #[test]
    fn flush_offset_moves_every_row() {
        let buf = TextBuffer::new(1, 2, ColorDepth::Ansi16).unwrap();
        let s = flushed(&buf, 4, 10);
        assert!(s.contains("\x1b[11;5H"));
        assert!(s.contains("\x1b[12;5H"));
    }

    #[test]
    fn color_runs_emit_one_escape_each() {
        let mut buf = TextBuffer::new(4, 1, ColorDepth::Ansi16).unwrap();
        for x in 0..4 {
            let fg = if x < 2 { Color::RED } else { Color::BLUE };
            buf.set_point(x, 0, 'x', fg, Color::BLACK).unwrap();
        }
        assert_eq!(
            flushed(&buf, 0, 0),
            "\x1b[31m\x1b[40m\x1b[1;1Hxx\x1b[34mxx\x1b[0m"
        );
    }

    #[test]
    fn colors_carry_across_rows() {
        let mut buf = TextBuffer::new(1, 2, ColorDepth::Ansi16).unwrap();
        buf.clear_with('o', Color::GREEN, Color::BLACK);
        let s = flushed(&buf, 0, 0);
        assert_eq!(s.matches("\x1b[32m").count(), 1);
    }

    #[test]
    fn truecolor_flush_uses_24bit_sequences() {
        let mut buf = TextBuffer::new(1, 1, ColorDepth::TrueColor).unwrap();
        buf.set_point(0, 0, '@', Color::rgb8(1, 2, 3), Color::rgb8(4, 5, 6))
            .unwrap();
        assert_eq!(
            flushed(&buf, 0, 0),
            "\x1b[38;2;1;2;3m\x1b[48;2;4;5;6m\x1b[1;1H@\x1b[0m"
        );
    }

    #[test]
    fn flush_surfaces_sink_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let buf = TextBuffer::new(1, 1, ColorDepth::Ansi16).unwrap();
        assert!(matches!(buf.flush(&mut Broken), Err(Error::Io(_))));
    }
}
