// SPDX-License-Identifier: MIT
//
// ditherterm demo — the same hue/value gradient in every color mode.
//
// Paints a gradient into a terminal-sized grid once per mode, flushes each
// one, and waits for Enter between them. In Dither4 the gradient is drawn
// with the blank probe glyph, so every cell comes out as a shade glyph over
// a 16-color pair.
//
// Usage:
//   cargo run -p ditherterm --example demo
//   RUST_LOG=debug cargo run -p ditherterm --example demo

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use ditherterm::{Color, ColorMode, PlatformErrorPolicy, Terminal, TerminalConfig, ansi};

fn paint(term: &mut Terminal) -> ditherterm::Result<()> {
    let (w, h) = (term.width(), term.height().saturating_sub(1).max(1));
    term.clear();
    for y in 0..h {
        for x in 0..w {
            let hue = f32::from(x) / f32::from(w) * 360.0;
            let value = 1.0 - f32::from(y) / f32::from(h);
            term.set_background(Color::hsv(hue, 1.0, value));
            term.set_cursor(x, y);
            term.write_char(' ')?;
        }
    }
    term.set_foreground(Color::WHITE);
    term.set_background(Color::BLACK);
    term.set_cursor(0, h.min(term.height() - 1));
    let mode = term.mode();
    write!(term, "{mode:?} - press Enter").ok();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = TerminalConfig::from_console().platform_errors(PlatformErrorPolicy::Ignore);
    let mut term = Terminal::new(config)?;
    let stdout = io::stdout();
    let stdin = io::stdin();
    let mut line = String::new();

    {
        let mut out = stdout.lock();
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
    }

    for mode in ColorMode::ALL {
        term.set_mode(mode)?;
        paint(&mut term)?;
        let mut out = stdout.lock();
        term.flush(&mut out)?;
        drop(out);
        line.clear();
        stdin.lock().read_line(&mut line)?;
    }

    let mut out = stdout.lock();
    ansi::reset(&mut out)?;
    ansi::clear_screen(&mut out)?;
    ansi::cursor_show(&mut out)?;
    out.flush()?;
    Ok(())
}
