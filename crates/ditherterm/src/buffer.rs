// SPDX-License-Identifier: MIT
//
// Frame buffer contract and shared grid storage.
//
// Two backends implement the same contract:
//
//   TextBuffer    — `Cell` grid, flushed as an escape-sequence stream.
//   ConsoleBuffer — packed (glyph byte, color nibble pair) records, flushed
//                   through the OS console API in one bulk write.
//
// Both keep their storage in a `Grid<T>`: a flat `Vec<T>` with row-major
// indexing (`index = y * width + x`), so a row is a contiguous slice and the
// left-to-right scan during flush is linear.
//
// Colors are normalized at the call boundary. A buffer stores exactly one
// canonical representation (its `ColorDepth`), whatever the caller passed.
//
// Bounds: with the `bounds-check` feature (default) every coordinate is
// validated and reported as `Error::Bounds`. Without it, coordinates go
// straight into slice indexing.

use crate::cell::{Cell, DEFAULT_BG, DEFAULT_FG};
use crate::color::Color;
use crate::console::ConsoleBuffer;
use crate::error::{Error, Result};
use crate::text::TextBuffer;

// ─── ColorDepth ──────────────────────────────────────────────────────────────

/// The canonical color representation a buffer stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorDepth {
    /// 16-color palette (`Color::Indexed4`).
    Ansi16,
    /// 256-color palette (`Color::Indexed8`).
    Ansi256,
    /// 24-bit (`Color::Indexed24`).
    TrueColor,
}

impl ColorDepth {
    /// Convert any color into this depth's representation.
    ///
    /// 16-color conversion uses the heuristic classifier
    /// ([`Ansi16::approximate`](crate::color::Ansi16::approximate)).
    #[must_use]
    pub fn normalize(self, color: Color) -> Color {
        match self {
            Self::Ansi16 => Color::Indexed4(color.to_ansi16()),
            Self::Ansi256 => Color::Indexed8(color.to_ansi256()),
            Self::TrueColor => Color::Indexed24(color.to_rgb8()),
        }
    }

    /// A blank cell in this depth.
    #[must_use]
    pub fn blank(self) -> Cell {
        Cell::new(' ', self.normalize(DEFAULT_FG), self.normalize(DEFAULT_BG))
    }
}

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// Per-cell mutation contract shared by every backend.
///
/// Not thread-safe: one owner mutates or flushes an instance at a time.
pub trait FrameBuffer {
    fn width(&self) -> u16;

    fn height(&self) -> u16;

    /// The representation colors are normalized to on the way in.
    fn depth(&self) -> ColorDepth;

    /// Read back the cell at `(x, y)` as stored.
    ///
    /// # Errors
    ///
    /// [`Error::Bounds`] if the coordinate is outside the buffer.
    fn cell(&self, x: u16, y: u16) -> Result<Cell>;

    /// # Errors
    ///
    /// [`Error::Bounds`] if the coordinate is outside the buffer.
    fn set_char(&mut self, x: u16, y: u16, ch: char) -> Result<()>;

    /// # Errors
    ///
    /// [`Error::Bounds`] if the coordinate is outside the buffer.
    fn set_foreground(&mut self, x: u16, y: u16, color: impl Into<Color>) -> Result<()>;

    /// # Errors
    ///
    /// [`Error::Bounds`] if the coordinate is outside the buffer.
    fn set_background(&mut self, x: u16, y: u16, color: impl Into<Color>) -> Result<()>;

    /// Character and both colors in one call.
    ///
    /// # Errors
    ///
    /// [`Error::Bounds`] if the coordinate is outside the buffer.
    fn set_point(
        &mut self,
        x: u16,
        y: u16,
        ch: char,
        fg: impl Into<Color>,
        bg: impl Into<Color>,
    ) -> Result<()> {
        self.set_char(x, y, ch)?;
        self.set_foreground(x, y, fg)?;
        self.set_background(x, y, bg)
    }

    /// Overwrite every cell.
    fn clear_with(&mut self, ch: char, fg: impl Into<Color>, bg: impl Into<Color>);

    /// Blank every cell (space, default colors).
    fn clear(&mut self) {
        self.clear_with(' ', DEFAULT_FG, DEFAULT_BG);
    }
}

/// Serialization of a buffer to its output surface.
///
/// The sink type differs per backend: a byte stream for escape sequences,
/// a console surface for the binary backend. The sink may borrow, so a
/// locked stdout or a caller's `Vec<u8>` works as well as an owned handle.
pub trait Flush: FrameBuffer {
    type Sink<'s>: ?Sized;

    /// Render the whole grid with its top-left corner at device position
    /// `(x, y)`. Either the whole grid is written or an error is returned.
    ///
    /// # Errors
    ///
    /// Whatever the sink reports.
    fn flush_at(&self, sink: &mut Self::Sink<'_>, x: u16, y: u16) -> Result<()>;

    /// Render at the device origin.
    ///
    /// # Errors
    ///
    /// Whatever the sink reports.
    fn flush(&self, sink: &mut Self::Sink<'_>) -> Result<()> {
        self.flush_at(sink, 0, 0)
    }
}

// ─── Grid ────────────────────────────────────────────────────────────────────

/// Fixed-size row-major storage. Dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: u16,
    height: u16,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// A `width × height` grid filled with `fill`.
    ///
    /// # Errors
    ///
    /// [`Error::Dimension`] if either dimension is zero.
    pub fn new(width: u16, height: u16, fill: T) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Dimension { width, height });
        }
        let size = usize::from(width) * usize::from(height);
        Ok(Self {
            width,
            height,
            cells: vec![fill; size],
        })
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Validate a coordinate. A no-op without the `bounds-check` feature.
    ///
    /// # Errors
    ///
    /// [`Error::Bounds`] if the coordinate is outside the grid.
    #[inline]
    pub fn check(&self, x: u16, y: u16) -> Result<()> {
        if cfg!(feature = "bounds-check") && !self.in_bounds(x, y) {
            return Err(Error::Bounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::Bounds`] if the coordinate is outside the grid.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Result<T> {
        self.check(x, y)?;
        Ok(self.cells[self.index(x, y)])
    }

    /// # Errors
    ///
    /// [`Error::Bounds`] if the coordinate is outside the grid.
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Result<&mut T> {
        self.check(x, y)?;
        let idx = self.index(x, y);
        Ok(&mut self.cells[idx])
    }

    /// One row as a slice, or `None` past the last row.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[T]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

// ─── Backend ─────────────────────────────────────────────────────────────────

/// The concrete buffer a terminal currently owns.
///
/// Replaced wholesale on a mode switch; there is no content migration.
#[derive(Debug)]
pub enum Backend {
    Text(TextBuffer),
    Console(ConsoleBuffer),
}

impl Backend {
    #[must_use]
    pub const fn is_console(&self) -> bool {
        matches!(self, Self::Console(_))
    }
}

impl FrameBuffer for Backend {
    fn width(&self) -> u16 {
        match self {
            Self::Text(b) => b.width(),
            Self::Console(b) => b.width(),
        }
    }

    fn height(&self) -> u16 {
        match self {
            Self::Text(b) => b.height(),
            Self::Console(b) => b.height(),
        }
    }

    fn depth(&self) -> ColorDepth {
        match self {
            Self::Text(b) => b.depth(),
            Self::Console(b) => b.depth(),
        }
    }

    fn cell(&self, x: u16, y: u16) -> Result<Cell> {
        match self {
            Self::Text(b) => b.cell(x, y),
            Self::Console(b) => b.cell(x, y),
        }
    }

    fn set_char(&mut self, x: u16, y: u16, ch: char) -> Result<()> {
        match self {
            Self::Text(b) => b.set_char(x, y, ch),
            Self::Console(b) => b.set_char(x, y, ch),
        }
    }

    fn set_foreground(&mut self, x: u16, y: u16, color: impl Into<Color>) -> Result<()> {
        match self {
            Self::Text(b) => b.set_foreground(x, y, color),
            Self::Console(b) => b.set_foreground(x, y, color),
        }
    }

    fn set_background(&mut self, x: u16, y: u16, color: impl Into<Color>) -> Result<()> {
        match self {
            Self::Text(b) => b.set_background(x, y, color),
            Self::Console(b) => b.set_background(x, y, color),
        }
    }

    fn clear_with(&mut self, ch: char, fg: impl Into<Color>, bg: impl Into<Color>) {
        match self {
            Self::Text(b) => b.clear_with(ch, fg, bg),
            Self::Console(b) => b.clear_with(ch, fg, bg),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
