// SPDX-License-Identifier: MIT

//! Terminal configuration.
//!
//! Everything is in memory; there is no config file. A [`TerminalConfig`] is
//! built up with chained setters and handed to
//! [`Terminal::new`](crate::terminal::Terminal::new).
//!
//! # Color modes
//!
//! | Mode      | Stored as   | Backend (Auto)             | Dither |
//! |-----------|-------------|----------------------------|--------|
//! | `Plain4`  | `Indexed4`  | console if available, text | no     |
//! | `Dither4` | `Indexed4`  | console if available, text | yes    |
//! | `Plain8`  | `Indexed8`  | text                       | no     |
//! | `Plain24` | `Indexed24` | text                       | no     |

use crate::buffer::ColorDepth;
use crate::dither::{DEFAULT_RESOLUTION, DitherPreset};
use crate::sys;

/// Fallback size when the controlling terminal cannot be queried.
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

// ─── ColorMode ───────────────────────────────────────────────────────────────

/// Color fidelity of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// 16 colors.
    #[default]
    Plain4,
    /// 16 colors, with shade glyphs standing in for the missing ones.
    Dither4,
    /// 256 colors.
    Plain8,
    /// 24-bit truecolor.
    Plain24,
}

impl ColorMode {
    pub const ALL: [Self; 4] = [Self::Plain4, Self::Dither4, Self::Plain8, Self::Plain24];

    #[must_use]
    pub const fn depth(self) -> ColorDepth {
        match self {
            Self::Plain4 | Self::Dither4 => ColorDepth::Ansi16,
            Self::Plain8 => ColorDepth::Ansi256,
            Self::Plain24 => ColorDepth::TrueColor,
        }
    }

    #[must_use]
    pub const fn is_dithered(self) -> bool {
        matches!(self, Self::Dither4)
    }

    /// Whether the console backend can serve this mode.
    #[must_use]
    pub const fn is_four_bit(self) -> bool {
        matches!(self.depth(), ColorDepth::Ansi16)
    }

    /// Best mode the environment advertises, from `COLORTERM` and `TERM`.
    #[must_use]
    pub fn detect() -> Self {
        let colorterm = std::env::var("COLORTERM").ok();
        let term = std::env::var("TERM").ok();
        Self::from_env(colorterm.as_deref(), term.as_deref())
    }

    /// Decide from explicit `COLORTERM` / `TERM` values.
    #[must_use]
    pub fn from_env(colorterm: Option<&str>, term: Option<&str>) -> Self {
        if let Some(ct) = colorterm {
            let ct = ct.to_ascii_lowercase();
            if ct == "truecolor" || ct == "24bit" {
                return Self::Plain24;
            }
        }
        if term.is_some_and(|t| t.contains("256color")) {
            return Self::Plain8;
        }
        Self::Plain4
    }
}

// ─── Policies ────────────────────────────────────────────────────────────────

/// Which backend 16-color modes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendPreference {
    /// Console backend when a console surface exists, text otherwise.
    #[default]
    Auto,
    /// Always escape sequences.
    Text,
    /// Console backend for 16-color modes. Falls back to text when there is
    /// no console surface, and always for 256 and truecolor.
    Console,
}

/// What to do when enabling escape processing on the output handle fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlatformErrorPolicy {
    /// Surface [`Error::Platform`](crate::Error::Platform).
    #[default]
    Raise,
    /// Log a warning and carry on.
    Ignore,
}

// ─── TerminalConfig ──────────────────────────────────────────────────────────

/// Construction parameters for a [`Terminal`](crate::terminal::Terminal).
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalConfig {
    pub width: u16,
    pub height: u16,
    pub mode: ColorMode,
    pub backend: BackendPreference,
    pub platform_errors: PlatformErrorPolicy,
    pub dither_resolution: u16,
    pub dither_preset: DitherPreset,
}

impl TerminalConfig {
    /// A `width × height` Plain4 terminal with default policies.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            mode: ColorMode::default(),
            backend: BackendPreference::default(),
            platform_errors: PlatformErrorPolicy::default(),
            dither_resolution: DEFAULT_RESOLUTION,
            dither_preset: DitherPreset::default(),
        }
    }

    /// Sized to the controlling terminal, 80×24 when that is unknown.
    #[must_use]
    pub fn from_console() -> Self {
        let (w, h) = sys::get_size().map_or(FALLBACK_SIZE, |s| (s.cols, s.rows));
        Self::new(w, h)
    }

    #[must_use]
    pub const fn mode(mut self, mode: ColorMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub const fn platform_errors(mut self, policy: PlatformErrorPolicy) -> Self {
        self.platform_errors = policy;
        self
    }

    /// Grid resolution for the lazily built dither table.
    #[must_use]
    pub const fn dither_resolution(mut self, resolution: u16) -> Self {
        self.dither_resolution = resolution;
        self
    }

    #[must_use]
    pub fn dither_preset(mut self, preset: DitherPreset) -> Self {
        self.dither_preset = preset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_depths() {
        assert_eq!(ColorMode::Plain4.depth(), ColorDepth::Ansi16);
        assert_eq!(ColorMode::Dither4.depth(), ColorDepth::Ansi16);
        assert_eq!(ColorMode::Plain8.depth(), ColorDepth::Ansi256);
        assert_eq!(ColorMode::Plain24.depth(), ColorDepth::TrueColor);
    }

    #[test]
    fn only_dither4_is_dithered() {
        let dithered: Vec<_> = ColorMode::ALL.iter().filter(|m| m.is_dithered()).collect();
        assert_eq!(dithered, vec![&ColorMode::Dither4]);
    }

    #[test]
    fn detect_truecolor() {
        assert_eq!(ColorMode::from_env(Some("truecolor"), None), ColorMode::Plain24);
        assert_eq!(
            ColorMode::from_env(Some("24BIT"), Some("xterm")),
            ColorMode::Plain24
        );
    }

    #[test]
    fn detect_256() {
        assert_eq!(
            ColorMode::from_env(None, Some("xterm-256color")),
            ColorMode::Plain8
        );
        assert_eq!(
            ColorMode::from_env(Some("yes"), Some("screen-256color")),
            ColorMode::Plain8
        );
    }

    #[test]
    fn detect_defaults_to_16() {
        assert_eq!(ColorMode::from_env(None, None), ColorMode::Plain4);
        assert_eq!(ColorMode::from_env(None, Some("vt100")), ColorMode::Plain4);
    }

    #[test]
    fn builder_sets_fields() {
        let cfg = TerminalConfig::new(10, 5)
            .mode(ColorMode::Dither4)
            .backend(BackendPreference::Text)
            .platform_errors(PlatformErrorPolicy::Ignore)
            .dither_resolution(4);
        assert_eq!((cfg.width, cfg.height), (10, 5));
        assert_eq!(cfg.mode, ColorMode::Dither4);
        assert_eq!(cfg.backend, BackendPreference::Text);
        assert_eq!(cfg.platform_errors, PlatformErrorPolicy::Ignore);
        assert_eq!(cfg.dither_resolution, 4);
        assert_eq!(cfg.dither_preset, DitherPreset::default());
    }

    #[test]
    fn from_console_has_positive_size() {
        let cfg = TerminalConfig::from_console();
        assert!(cfg.width > 0 && cfg.height > 0);
    }
}
