// SPDX-License-Identifier: MIT
//
// Platform console backend.
//
// Each cell is a two-byte record: a code page 437 glyph byte and an
// attribute byte holding `bg << 4 | fg` as 16-color indices. This backend
// only exists for the 16-color modes, so the nibbles are enough.
//
// Flushing does not produce text. The whole record array goes to a
// `ConsoleSurface` in one call, addressed by a destination rectangle. The
// real surface (Windows console output) lives in `sys`; tests use a
// recording surface.

use std::io;

use log::{debug, trace};

use crate::buffer::{ColorDepth, Flush, FrameBuffer, Grid};
use crate::cell::{Cell, DEFAULT_BG, DEFAULT_FG};
use crate::codepage;
use crate::color::{Ansi16, Color};
use crate::error::{Error, Result};

// ─── CellRecord ──────────────────────────────────────────────────────────────

/// One packed console cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRecord {
    /// Code page 437 glyph byte.
    pub code: u8,
    /// `bg << 4 | fg`, 16-color indices in ANSI order.
    pub attr: u8,
}

impl CellRecord {
    #[must_use]
    pub const fn new(code: u8, fg: Ansi16, bg: Ansi16) -> Self {
        Self {
            code,
            attr: (bg.index() << 4) | fg.index(),
        }
    }

    #[must_use]
    pub const fn fg(self) -> Ansi16 {
        Ansi16::ALL[(self.attr & 0x0F) as usize]
    }

    #[must_use]
    pub const fn bg(self) -> Ansi16 {
        Ansi16::ALL[(self.attr >> 4) as usize]
    }

    #[must_use]
    pub const fn with_fg(self, fg: Ansi16) -> Self {
        Self {
            attr: (self.attr & 0xF0) | fg.index(),
            ..self
        }
    }

    #[must_use]
    pub const fn with_bg(self, bg: Ansi16) -> Self {
        Self {
            attr: (self.attr & 0x0F) | (bg.index() << 4),
            ..self
        }
    }

    /// Attribute word in console order.
    ///
    /// The console numbers colors blue=1, green=2, red=4 where ANSI uses
    /// red=1, green=2, blue=4, so bits 0 and 2 swap in each nibble.
    #[must_use]
    pub const fn console_attributes(self) -> u16 {
        let a = self.attr;
        let swapped = (a & 0b1010_1010) | ((a & 0b0001_0001) << 2) | ((a & 0b0100_0100) >> 2);
        swapped as u16
    }
}

// ─── ConsoleSurface ──────────────────────────────────────────────────────────

/// Destination for a bulk record write.
pub trait ConsoleSurface {
    /// Write `width × height` row-major records with their top-left corner
    /// at `(x, y)`. All or nothing.
    ///
    /// # Errors
    ///
    /// The OS error of the underlying console call.
    fn write_region(
        &mut self,
        records: &[CellRecord],
        width: u16,
        height: u16,
        x: u16,
        y: u16,
    ) -> io::Result<()>;
}

// ─── ConsoleBuffer ───────────────────────────────────────────────────────────

/// Packed 16-color frame buffer flushed through a [`ConsoleSurface`].
#[derive(Debug, Clone)]
pub struct ConsoleBuffer {
    grid: Grid<CellRecord>,
}

fn blank_record() -> CellRecord {
    CellRecord::new(b' ', DEFAULT_FG.to_ansi16(), DEFAULT_BG.to_ansi16())
}

impl ConsoleBuffer {
    /// # Errors
    ///
    /// [`Error::Dimension`] if either dimension is zero.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let grid = Grid::new(width, height, blank_record())?;
        debug!("console buffer {width}x{height}");
        Ok(Self { grid })
    }

    /// Raw records, row-major.
    #[must_use]
    pub fn records(&self) -> &[CellRecord] {
        self.grid.cells()
    }

    /// # Errors
    ///
    /// [`Error::Bounds`] if the coordinate is outside the buffer.
    pub fn record(&self, x: u16, y: u16) -> Result<CellRecord> {
        self.grid.get(x, y)
    }
}

impl FrameBuffer for ConsoleBuffer {
    fn width(&self) -> u16 {
        self.grid.width()
    }

    fn height(&self) -> u16 {
        self.grid.height()
    }

    fn depth(&self) -> ColorDepth {
        ColorDepth::Ansi16
    }

    fn cell(&self, x: u16, y: u16) -> Result<Cell> {
        let rec = self.grid.get(x, y)?;
        Ok(Cell::new(
            codepage::decode(rec.code),
            Color::Indexed4(rec.fg()),
            Color::Indexed4(rec.bg()),
        ))
    }

    fn set_char(&mut self, x: u16, y: u16, ch: char) -> Result<()> {
        self.grid.get_mut(x, y)?.code = codepage::encode(ch);
        Ok(())
    }

    fn set_foreground(&mut self, x: u16, y: u16, color: impl Into<Color>) -> Result<()> {
        let fg = color.into().to_ansi16();
        let rec = self.grid.get_mut(x, y)?;
        *rec = rec.with_fg(fg);
        Ok(())
    }

    fn set_background(&mut self, x: u16, y: u16, color: impl Into<Color>) -> Result<()> {
        let bg = color.into().to_ansi16();
        let rec = self.grid.get_mut(x, y)?;
        *rec = rec.with_bg(bg);
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
        let rec = CellRecord::new(
            codepage::encode(ch),
            fg.into().to_ansi16(),
            bg.into().to_ansi16(),
        );
        *self.grid.get_mut(x, y)? = rec;
        Ok(())
    }

    fn clear_with(&mut self, ch: char, fg: impl Into<Color>, bg: impl Into<Color>) {
        self.grid.fill(CellRecord::new(
            codepage::encode(ch),
            fg.into().to_ansi16(),
            bg.into().to_ansi16(),
        ));
    }
}

impl Flush for ConsoleBuffer {
    type Sink<'s> = dyn ConsoleSurface + 's;

    fn flush_at(&self, sink: &mut Self::Sink<'_>, x: u16, y: u16) -> Result<()> {
        let (w, h) = (self.grid.width(), self.grid.height());
        trace!("console flush {w}x{h} at ({x}, {y}): {} records", self.grid.total_cells());
        sink.write_region(self.grid.cells(), w, h, x, y)
            .map_err(Error::Platform)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recording {
        calls: Vec<(Vec<CellRecord>, u16, u16, u16, u16)>,
    }

    impl ConsoleSurface for Recording {
        fn write_region(
            &mut self,
            records: &[CellRecord],
            width: u16,
            height: u16,
            x: u16,
            y: u16,
        ) -> io::Result<()> {
            self.calls.push((records.to_vec(), width, height, x, y));
            Ok(())
        }
    }

    struct Failing;

    impl ConsoleSurface for Failing {
        fn write_region(&mut self, _: &[CellRecord], _: u16, _: u16, _: u16, _: u16) -> io::Result<()> {
            Err(io::Error::other("invalid handle"))
        }
    }

    // ── CellRecord ──────────────────────────────────────────────────────

    #[test]
    fn attr_packs_background_high() {
        let rec = CellRecord::new(b'x', Ansi16::BrightRed, Ansi16::Blue);
        assert_eq!(rec.attr, 0x49);
        assert_eq!(rec.fg(), Ansi16::BrightRed);
        assert_eq!(rec.bg(), Ansi16::Blue);
    }

    #[test]
    fn console_attributes_swap_red_and_blue() {
        // ANSI red (1) is console red (4); ANSI blue (4) is console blue (1).
        let rec = CellRecord::new(b' ', Ansi16::Red, Ansi16::Blue);
        assert_eq!(rec.console_attributes(), 0x14);
        // Green and intensity bits stay put.
        let rec = CellRecord::new(b' ', Ansi16::BrightGreen, Ansi16::Black);
        assert_eq!(rec.console_attributes(), 0x0A);
        let rec = CellRecord::new(b' ', Ansi16::BrightCyan, Ansi16::Yellow);
        assert_eq!(rec.console_attributes(), 0x6B);
    }

    #[test]
    fn with_fg_and_bg_touch_one_nibble() {
        let rec = CellRecord::new(b'a', Ansi16::Gray, Ansi16::Black)
            .with_fg(Ansi16::White)
            .with_bg(Ansi16::Magenta);
        assert_eq!(rec.attr, 0x5F);
        assert_eq!(rec.code, b'a');
    }

    // ── ConsoleBuffer ───────────────────────────────────────────────────

    #[test]
    fn new_buffer_is_blank_gray_on_black() {
        let buf = ConsoleBuffer::new(2, 2).unwrap();
        assert_eq!(buf.record(1, 1).unwrap(), CellRecord { code: b' ', attr: 0x07 });
        assert_eq!(buf.cell(1, 1).unwrap(), Cell::BLANK);
        assert_eq!(buf.depth(), ColorDepth::Ansi16);
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(ConsoleBuffer::new(3, 0), Err(Error::Dimension { .. })));
    }

    #[test]
    fn glyphs_are_encoded_to_cp437() {
        let mut buf = ConsoleBuffer::new(3, 1).unwrap();
        buf.set_char(0, 0, '▒').unwrap();
        buf.set_char(1, 0, 'A').unwrap();
        buf.set_char(2, 0, '中').unwrap();
        let codes: Vec<u8> = buf.records().iter().map(|r| r.code).collect();
        assert_eq!(codes, vec![0xB1, b'A', b'?']);
        assert_eq!(buf.cell(0, 0).unwrap().ch, '▒');
    }

    #[test]
    fn continuous_colors_are_approximated() {
        let mut buf = ConsoleBuffer::new(1, 1).unwrap();
        buf.set_point(0, 0, 'x', Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.0, 0.0, 0.1))
            .unwrap();
        let rec = buf.record(0, 0).unwrap();
        assert_eq!(rec.fg(), Ansi16::BrightRed);
        assert_eq!(rec.bg(), Ansi16::Black);
    }

    #[test]
    fn clear_with_fills_every_record() {
        let mut buf = ConsoleBuffer::new(3, 2).unwrap();
        buf.clear_with('#', Color::GREEN, Color::BLUE);
        let expected = CellRecord::new(b'#', Ansi16::Green, Ansi16::Blue);
        assert!(buf.records().iter().all(|&r| r == expected));
    }

    // ── Flush ───────────────────────────────────────────────────────────

    #[test]
    fn flush_is_a_single_region_write() {
        let mut buf = ConsoleBuffer::new(2, 1).unwrap();
        buf.set_char(1, 0, 'z').unwrap();
        let mut surface = Recording::default();
        buf.flush_at(&mut surface, 5, 7).unwrap();
        assert_eq!(surface.calls.len(), 1);
        let (records, w, h, x, y) = &surface.calls[0];
        assert_eq!((*w, *h, *x, *y), (2, 1, 5, 7));
        assert_eq!(records[1].code, b'z');
    }

    #[test]
    fn flush_into_borrowing_surface() {
        struct Borrowed<'a>(&'a mut Vec<u8>);

        impl ConsoleSurface for Borrowed<'_> {
            fn write_region(&mut self, records: &[CellRecord], _: u16, _: u16, _: u16, _: u16) -> io::Result<()> {
                self.0.extend(records.iter().map(|r| r.code));
                Ok(())
            }
        }

        let mut buf = ConsoleBuffer::new(2, 1).unwrap();
        buf.set_char(0, 0, 'o').unwrap();
        buf.set_char(1, 0, 'k').unwrap();
        let mut codes = Vec::new();
        buf.flush(&mut Borrowed(&mut codes)).unwrap();
        assert_eq!(codes, b"ok");
    }

    #[test]
    fn surface_failure_is_a_platform_error() {
        let buf = ConsoleBuffer::new(1, 1).unwrap();
        assert!(matches!(buf.flush(&mut Failing), Err(Error::Platform(_))));
    }
}
