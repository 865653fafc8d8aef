// SPDX-License-Identifier: MIT
//
// Cell — the atomic unit of the grid.
//
// Every character position in a frame buffer is one Cell: a Unicode scalar
// plus a foreground and a background color. Buffers normalize colors to
// their own canonical representation before storing them, so two cells
// from the same buffer compare exactly.

use crate::color::Color;

/// Foreground used by blank cells: the 16-color light gray most terminals
/// show by default.
pub const DEFAULT_FG: Color = Color::GRAY;

/// Background used by blank cells.
pub const DEFAULT_BG: Color = Color::BLACK;

/// A single grid cell.
///
/// # Examples
///
/// ```
/// use ditherterm::cell::Cell;
/// use ditherterm::color::Color;
///
/// let cell = Cell::new('x', Color::RED, Color::BLACK);
/// assert_eq!(cell.with_char('y').ch, 'y');
/// assert_eq!(Cell::BLANK.ch, ' ');
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    /// A space in the default colors.
    pub const BLANK: Self = Self {
        ch: ' ',
        fg: DEFAULT_FG,
        bg: DEFAULT_BG,
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }

    #[inline]
    #[must_use]
    pub const fn with_char(self, ch: char) -> Self {
        Self { ch, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: Color) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: Color) -> Self {
        Self { bg, ..self }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}
