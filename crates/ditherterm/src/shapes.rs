// SPDX-License-Identifier: MIT
//
// Shape helpers over any frame buffer.
//
// Both helpers validate their endpoints up front, whether or not the
// `bounds-check` feature is on, and touch nothing when one is outside the
// buffer.

use crate::buffer::FrameBuffer;
use crate::color::Color;
use crate::error::{Error, Result};

fn check<B: FrameBuffer>(buf: &B, x: u16, y: u16) -> Result<()> {
    if x < buf.width() && y < buf.height() {
        Ok(())
    } else {
        Err(Error::Bounds {
            x,
            y,
            width: buf.width(),
            height: buf.height(),
        })
    }
}

/// Fill the inclusive rectangle between two corners. Corners may be given in
/// either order.
///
/// Returns the number of cells written,
/// `(|ex − sx| + 1) · (|ey − sy| + 1)`.
///
/// # Errors
///
/// [`Error::Bounds`] if either corner is outside the buffer.
#[allow(clippy::too_many_arguments)]
pub fn fill_rectangle<B: FrameBuffer>(
    buf: &mut B,
    start_x: u16,
    start_y: u16,
    end_x: u16,
    end_y: u16,
    ch: char,
    fg: impl Into<Color>,
    bg: impl Into<Color>,
) -> Result<usize> {
    check(buf, start_x, start_y)?;
    check(buf, end_x, end_y)?;
    let (fg, bg) = (fg.into(), bg.into());

    let mut touched = 0;
    for y in start_y.min(end_y)..=start_y.max(end_y) {
        for x in start_x.min(end_x)..=start_x.max(end_x) {
            buf.set_point(x, y, ch, fg, bg)?;
            touched += 1;
        }
    }
    Ok(touched)
}

/// Draw a straight line between two points, endpoints included.
///
/// Returns the number of cells written.
///
/// # Errors
///
/// [`Error::Bounds`] if either endpoint is outside the buffer.
#[allow(clippy::too_many_arguments)]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn draw_line<B: FrameBuffer>(
    buf: &mut B,
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
    ch: char,
    fg: impl Into<Color>,
    bg: impl Into<Color>,
) -> Result<usize> {
    check(buf, x0, y0)?;
    check(buf, x1, y1)?;
    let (fg, bg) = (fg.into(), bg.into());

    // Bresenham over all octants.
    let (mut x, mut y) = (i32::from(x0), i32::from(y0));
    let (tx, ty) = (i32::from(x1), i32::from(y1));
    let dx = (tx - x).abs();
    let dy = -(ty - y).abs();
    let sx = if x < tx { 1 } else { -1 };
    let sy = if y < ty { 1 } else { -1 };
    let mut err = dx + dy;

    let mut touched = 0;
    loop {
        // Both endpoints are in bounds, so every point between is too.
        buf.set_point(x as u16, y as u16, ch, fg, bg)?;
        touched += 1;
        if x == tx && y == ty {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    Ok(touched)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
