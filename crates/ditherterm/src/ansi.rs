// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that is the text backend's job. This
// module only knows the byte-level encoding of each sequence.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (CUP uses 1-based coordinates).

use std::io::{self, Write};

use crate::color::{Color, Rgb8};

/// SGR 0, resets every attribute and both colors.
pub const RESET: &[u8] = b"\x1b[0m";

/// Foreground SGR for each 16-color id (30–37, 90–97).
#[rustfmt::skip]
pub const FG_16: [&str; 16] = [
    "\x1b[30m", "\x1b[31m", "\x1b[32m", "\x1b[33m",
    "\x1b[34m", "\x1b[35m", "\x1b[36m", "\x1b[37m",
    "\x1b[90m", "\x1b[91m", "\x1b[92m", "\x1b[93m",
    "\x1b[94m", "\x1b[95m", "\x1b[96m", "\x1b[97m",
];

/// Background SGR for each 16-color id (40–47, 100–107).
#[rustfmt::skip]
pub const BG_16: [&str; 16] = [
    "\x1b[40m", "\x1b[41m", "\x1b[42m", "\x1b[43m",
    "\x1b[44m", "\x1b[45m", "\x1b[46m", "\x1b[47m",
    "\x1b[100m", "\x1b[101m", "\x1b[102m", "\x1b[103m",
    "\x1b[104m", "\x1b[105m", "\x1b[106m", "\x1b[107m",
];

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using CUP.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(RESET)
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Set the foreground color.
///
/// 16-color entries use the compact SGR tables, 256-color indices the
/// `38;5;N` form, and everything else is emitted as 24-bit `38;2;R;G;B`.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Indexed4(c) => w.write_all(FG_16[usize::from(c.index())].as_bytes()),
        Color::Indexed8(idx) => write!(w, "\x1b[38;5;{idx}m"),
        other => {
            let Rgb8 { r, g, b } = other.to_rgb8();
            write!(w, "\x1b[38;2;{r};{g};{b}m")
        }
    }
}

/// Set the background color. Same encoding strategy as [`fg`].
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Indexed4(c) => w.write_all(BG_16[usize::from(c.index())].as_bytes()),
        Color::Indexed8(idx) => write!(w, "\x1b[48;5;{idx}m"),
        other => {
            let Rgb8 { r, g, b } = other.to_rgb8();
            write!(w, "\x1b[48;2;{r};{g};{b}m")
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
