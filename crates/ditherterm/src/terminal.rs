// SPDX-License-Identifier: MIT
//
// Terminal: cursor, logical colors, and the active frame buffer.
//
// The terminal owns exactly one backend at a time. Changing the color mode
// builds a fresh backend of the same size and drops the old one along with
// its contents.
//
// Character writes follow classic teletype rules:
//
//   '\r'        column 0
//   '\n'        column 0, next row
//   '\t'        a space, then spaces up to the next multiple of 4
//   other C0/C1 rendered as '?'
//
// After every printed glyph the column advances; running off the right edge
// wraps to the next row, and running off the bottom wraps to row 0. There is
// no scrollback.
//
// In `Dither4` mode two probe glyphs are special: a blank asks for the
// current background and a full block for the current foreground, each
// rendered as the dither engine's best shade glyph and color pair. Every
// other glyph is written with the logical colors as-is.

use std::fmt;
use std::io::{self, Write};

use log::debug;

use crate::buffer::{Backend, Flush, FrameBuffer};
use crate::cell::{DEFAULT_BG, DEFAULT_FG};
use crate::color::Color;
use crate::config::{BackendPreference, ColorMode, PlatformErrorPolicy, TerminalConfig};
use crate::console::{ConsoleBuffer, ConsoleSurface};
use crate::dither::{self, BLANK_PROBE, DitherEngine, SOLID_PROBE};
use crate::error::{Error, Result};
use crate::sys;
use crate::text::TextBuffer;

/// Tab stops every this many columns.
pub const TAB_WIDTH: u16 = 4;

/// Glyph written in place of control characters.
pub const CONTROL_REPLACEMENT: char = '?';

pub struct Terminal {
    backend: Backend,
    mode: ColorMode,
    preference: BackendPreference,
    platform_errors: PlatformErrorPolicy,
    surface: Option<Box<dyn ConsoleSurface>>,
    col: u16,
    row: u16,
    fg: Color,
    bg: Color,
    dither: DitherEngine,
    dither_resolution: u16,
}

impl Terminal {
    /// Build a terminal on the process's console surface, if any.
    ///
    /// # Errors
    ///
    /// [`Error::Dimension`] for a zero size, [`Error::Range`] for a dither
    /// resolution outside the supported range, [`Error::Platform`] if escape
    /// processing cannot be enabled under [`PlatformErrorPolicy::Raise`].
    pub fn new(config: TerminalConfig) -> Result<Self> {
        Self::with_surface(config, sys::console_surface())
    }

    /// Build a terminal that flushes its console backend to `surface`.
    /// `None` means escape sequences only.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_surface(
        config: TerminalConfig,
        surface: Option<Box<dyn ConsoleSurface>>,
    ) -> Result<Self> {
        let TerminalConfig {
            width,
            height,
            mode,
            backend,
            platform_errors,
            dither_resolution,
            dither_preset,
        } = config;

        if !(dither::MIN_RESOLUTION..=dither::MAX_RESOLUTION).contains(&dither_resolution) {
            return Err(Error::Range {
                what: "dither resolution",
                value: f64::from(dither_resolution),
                min: f64::from(dither::MIN_RESOLUTION),
                max: f64::from(dither::MAX_RESOLUTION),
            });
        }

        let console = Self::console_eligible(mode, backend, surface.is_some());
        Ok(Self {
            backend: Self::build_backend(mode, console, platform_errors, width, height)?,
            mode,
            preference: backend,
            platform_errors,
            surface,
            col: 0,
            row: 0,
            fg: DEFAULT_FG,
            bg: DEFAULT_BG,
            dither: DitherEngine::new(dither_preset),
            dither_resolution,
        })
    }

    const fn console_eligible(
        mode: ColorMode,
        preference: BackendPreference,
        has_surface: bool,
    ) -> bool {
        mode.is_four_bit() && has_surface && !matches!(preference, BackendPreference::Text)
    }

    fn build_backend(
        mode: ColorMode,
        console: bool,
        policy: PlatformErrorPolicy,
        width: u16,
        height: u16,
    ) -> Result<Backend> {
        if console {
            debug!("{mode:?}: console backend {width}x{height}");
            return Ok(Backend::Console(ConsoleBuffer::new(width, height)?));
        }
        sys::enable_escape_processing(policy)?;
        debug!("{mode:?}: text backend {width}x{height}");
        Ok(Backend::Text(TextBuffer::new(width, height, mode.depth())?))
    }

    // ── Mode ────────────────────────────────────────────────────────────

    #[must_use]
    pub const fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Switch color mode. The grid is rebuilt blank; the cursor and logical
    /// colors are kept.
    ///
    /// # Errors
    ///
    /// [`Error::Platform`] if the new backend needs escape processing and
    /// enabling it fails under [`PlatformErrorPolicy::Raise`].
    pub fn set_mode(&mut self, mode: ColorMode) -> Result<()> {
        let console = Self::console_eligible(mode, self.preference, self.surface.is_some());
        let backend =
            Self::build_backend(mode, console, self.platform_errors, self.width(), self.height())?;
        debug!("mode {:?} -> {mode:?}", self.mode);
        self.backend = backend;
        self.mode = mode;
        Ok(())
    }

    // ── Geometry and cursor ─────────────────────────────────────────────

    #[must_use]
    pub fn width(&self) -> u16 {
        self.backend.width()
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.backend.height()
    }

    /// Cursor as `(column, row)`.
    #[must_use]
    pub const fn cursor(&self) -> (u16, u16) {
        (self.col, self.row)
    }

    /// Move the cursor, clamped to the grid.
    pub fn set_cursor(&mut self, col: u16, row: u16) {
        self.col = col.min(self.width() - 1);
        self.row = row.min(self.height() - 1);
    }

    // ── Colors ──────────────────────────────────────────────────────────

    #[must_use]
    pub const fn foreground(&self) -> Color {
        self.fg
    }

    #[must_use]
    pub const fn background(&self) -> Color {
        self.bg
    }

    /// Logical foreground for subsequent writes, kept at full fidelity.
    pub fn set_foreground(&mut self, color: impl Into<Color>) {
        self.fg = color.into();
    }

    pub fn set_background(&mut self, color: impl Into<Color>) {
        self.bg = color.into();
    }

    // ── Writing ─────────────────────────────────────────────────────────

    /// Write one character at the cursor.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] or [`Error::State`] only if the dither table cannot
    /// be built; otherwise whatever the backend reports.
    pub fn write_char(&mut self, ch: char) -> Result<()> {
        match ch {
            '\r' => self.col = 0,
            '\n' => {
                self.col = 0;
                self.next_row();
            }
            '\t' => {
                self.put(' ')?;
                while self.col % TAB_WIDTH != 0 {
                    self.put(' ')?;
                }
            }
            c if c.is_control() => self.put(CONTROL_REPLACEMENT)?,
            c => self.put(c)?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`write_char`](Self::write_char).
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        s.chars().try_for_each(|ch| self.write_char(ch))
    }

    fn put(&mut self, ch: char) -> Result<()> {
        if self.mode.is_dithered() && (ch == BLANK_PROBE || ch == SOLID_PROBE) {
            let target = if ch == BLANK_PROBE { self.bg } else { self.fg };
            let shade = self.dithered(target)?;
            self.backend
                .set_point(self.col, self.row, shade.glyph, shade.fg, shade.bg)?;
        } else {
            self.backend
                .set_point(self.col, self.row, ch, self.fg, self.bg)?;
        }
        self.advance();
        Ok(())
    }

    fn dithered(&mut self, target: Color) -> Result<dither::Dither> {
        if !self.dither.is_precomputed() {
            self.dither.precompute(self.dither_resolution)?;
        }
        self.dither.lookup(target)
    }

    fn advance(&mut self) {
        self.col += 1;
        if self.col >= self.width() {
            self.col = 0;
            self.next_row();
        }
    }

    fn next_row(&mut self) {
        self.row += 1;
        if self.row >= self.height() {
            self.row = 0;
        }
    }

    /// Blank the grid in default colors and home the cursor.
    pub fn clear(&mut self) {
        self.backend.clear();
        self.col = 0;
        self.row = 0;
    }

    /// Fill the grid and home the cursor.
    pub fn clear_with(&mut self, ch: char, fg: impl Into<Color>, bg: impl Into<Color>) {
        self.backend.clear_with(ch, fg, bg);
        self.col = 0;
        self.row = 0;
    }

    // ── Dither ──────────────────────────────────────────────────────────

    /// Build the dither table now instead of on the first dithered write.
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadyPrecomputed`](crate::error::StateError) if the
    /// table already exists.
    pub fn precompute_dither(&mut self) -> Result<()> {
        self.dither.precompute(self.dither_resolution)
    }

    #[must_use]
    pub const fn dither(&self) -> &DitherEngine {
        &self.dither
    }

    // ── Buffer and output ───────────────────────────────────────────────

    #[must_use]
    pub const fn buffer(&self) -> &Backend {
        &self.backend
    }

    pub fn buffer_mut(&mut self) -> &mut Backend {
        &mut self.backend
    }

    /// Render the grid at the screen origin.
    ///
    /// # Errors
    ///
    /// See [`flush_at`](Self::flush_at).
    pub fn flush(&mut self, out: &mut dyn Write) -> Result<()> {
        self.flush_at(out, 0, 0)
    }

    /// Render the grid with its corner at `(x, y)`.
    ///
    /// The text backend writes escape sequences to `out`. The console
    /// backend ignores `out` and writes to the console surface.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if `out` fails, [`Error::Platform`] if the console
    /// surface fails.
    pub fn flush_at(&mut self, out: &mut dyn Write, x: u16, y: u16) -> Result<()> {
        match &self.backend {
            Backend::Text(buf) => buf.flush_at(out, x, y),
            Backend::Console(buf) => {
                let surface = self.surface.as_deref_mut().ok_or_else(|| {
                    Error::Platform(io::Error::other("console backend without a surface"))
                })?;
                buf.flush_at(surface, x, y)
            }
        }
    }
}

impl fmt::Write for Terminal {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Self::write_str(self, s).map_err(|_| fmt::Error)
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        Self::write_char(self, c).map_err(|_| fmt::Error)
    }
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("mode", &self.mode)
            .field("backend", &self.backend)
            .field("cursor", &self.cursor())
            .field("fg", &self.fg)
            .field("bg", &self.bg)
            .field("console_surface", &self.surface.is_some())
            .field("dither", &self.dither)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
