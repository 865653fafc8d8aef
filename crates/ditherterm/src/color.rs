// SPDX-License-Identifier: MIT
//
// Color model — continuous (RGB, HSV) and quantized (16, 256, 24-bit) colors.
//
// Single-character variable names (r, g, b, h, s, v, c, x, m) are the
// standard mathematical convention in color science.
#![allow(clippy::many_single_char_names)]
//
// One sum type carries all five representations. Every conversion is a pure,
// total function: out-of-range and NaN channels are clamped, never rejected.
// Only the explicit palette constructors (`ansi16`, `cube`, `gray`) validate
// their arguments, because an out-of-domain palette coordinate is a caller
// bug rather than a lossy color.
//
// Conversion graph:
//
//   Hsv ↔ Rgb ← Indexed4 / Indexed8 / Indexed24   (exact palette lookup)
//   Rgb → Indexed4 / Indexed8 / Indexed24         (lossy `approximate`)

use std::fmt;

use crate::error::{Error, Result};

/// Tolerance for comparing continuous channels.
const EPS: f32 = 1e-5;

// ─── Rgb ─────────────────────────────────────────────────────────────────────

/// Continuous RGB. Channels are conceptually in `0.0..=1.0` but are not
/// clamped until a conversion needs them to be.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Clamp every channel to `0.0..=1.0`, mapping NaN to 0.
    #[inline]
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(unit(self.r), unit(self.g), unit(self.b))
    }

    /// Per-channel square. Mixing and matching happen in this space because
    /// it tracks perceived brightness better than the raw channel values.
    #[inline]
    #[must_use]
    pub fn squared(self) -> Self {
        Self::new(self.r * self.r, self.g * self.g, self.b * self.b)
    }

    /// Squared Euclidean distance.
    #[inline]
    #[must_use]
    pub fn distance_sq(self, other: Self) -> f32 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        db.mul_add(db, dr.mul_add(dr, dg * dg))
    }

    /// Standard hexagon RGB → HSV.
    #[must_use]
    pub fn to_hsv(self) -> Hsv {
        let Self { r, g, b } = self.clamped();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta <= 0.0 {
            0.0
        } else {
            let partial = if max == r {
                (g - b) / delta
            } else if max == g {
                (b - r) / delta + 2.0
            } else {
                (r - g) / delta + 4.0
            };
            60.0 * partial.rem_euclid(6.0)
        };
        let s = if max > 0.0 { delta / max } else { 0.0 };

        Hsv::new(h, s, max)
    }

    fn approx_eq(self, other: Self) -> bool {
        (self.r - other.r).abs() < EPS
            && (self.g - other.g).abs() < EPS
            && (self.b - other.b).abs() < EPS
    }
}

// ─── Hsv ─────────────────────────────────────────────────────────────────────

/// Hue / saturation / value.
///
/// Fields are private so the hue is always stored normalized to `[0, 360)`
/// and saturation/value always lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    h: f32,
    s: f32,
    v: f32,
}

impl Hsv {
    /// Build an HSV color. Any real hue is accepted (wrapped into
    /// `[0, 360)`; NaN and infinities become 0). Saturation and value are
    /// clamped.
    #[must_use]
    pub fn new(h: f32, s: f32, v: f32) -> Self {
        Self {
            h: normalize_hue(h),
            s: unit(s),
            v: unit(v),
        }
    }

    /// Hue angle in degrees, `0.0 <= hue < 360.0`.
    #[inline]
    #[must_use]
    pub const fn hue(self) -> f32 {
        self.h
    }

    #[inline]
    #[must_use]
    pub const fn saturation(self) -> f32 {
        self.s
    }

    #[inline]
    #[must_use]
    pub const fn value(self) -> f32 {
        self.v
    }

    /// Six-sector HSV → RGB.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgb(self) -> Rgb {
        let c = self.s * self.v;
        let hp = self.h / 60.0;
        let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
        let m = self.v - c;

        // hp is in [0, 6) because the hue is normalized.
        let (r, g, b) = match hp as u8 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Rgb::new(r + m, g + m, b + m)
    }

    fn approx_eq(self, other: Self) -> bool {
        let achromatic = self.s < EPS || other.s < EPS || self.v < EPS || other.v < EPS;
        (self.s - other.s).abs() < EPS
            && (self.v - other.v).abs() < EPS
            && (achromatic || hue_diff(self.h, other.h) < EPS * 360.0)
    }
}

// ─── Rgb8 ────────────────────────────────────────────────────────────────────

/// 24-bit color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        Rgb::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }

    /// Scale each clamped channel by 255, truncating.
    #[must_use]
    pub fn approximate(color: Color) -> Self {
        if let Color::Indexed24(c) = color {
            return c;
        }
        let c = color.to_rgb().clamped();
        Self::new(to_byte(c.r), to_byte(c.g), to_byte(c.b))
    }
}

// ─── Ansi16 ──────────────────────────────────────────────────────────────────

/// The 16-color palette, in SGR order (index = SGR 30+n / 90+n-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Ansi16 {
    #[default]
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    Gray = 7,
    DarkGray = 8,
    BrightRed = 9,
    BrightGreen = 10,
    BrightYellow = 11,
    BrightBlue = 12,
    BrightMagenta = 13,
    BrightCyan = 14,
    White = 15,
}

/// Hue sectors of the heuristic classifier, in `round(hue / 60)` order,
/// as (dark, bright) pairs.
const HUE_SECTORS: [(Ansi16, Ansi16); 6] = [
    (Ansi16::Red, Ansi16::BrightRed),
    (Ansi16::Yellow, Ansi16::BrightYellow),
    (Ansi16::Green, Ansi16::BrightGreen),
    (Ansi16::Cyan, Ansi16::BrightCyan),
    (Ansi16::Blue, Ansi16::BrightBlue),
    (Ansi16::Magenta, Ansi16::BrightMagenta),
];

impl Ansi16 {
    /// Every palette entry, indexed by its own id.
    pub const ALL: [Self; 16] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::Gray,
        Self::DarkGray,
        Self::BrightRed,
        Self::BrightGreen,
        Self::BrightYellow,
        Self::BrightBlue,
        Self::BrightMagenta,
        Self::BrightCyan,
        Self::White,
    ];

    /// Palette entry for `idx`.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if `idx > 15`.
    pub fn from_index(idx: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(idx))
            .copied()
            .ok_or_else(|| Error::range("16-color index", idx, 15u8))
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub const fn to_rgb8(self) -> Rgb8 {
        palette::ANSI16_RGB[self as usize]
    }

    /// Heuristic classifier used for general color assignment.
    ///
    /// Branches on HSV thresholds instead of searching the palette:
    /// - value below 0.30 is black;
    /// - weakly saturated colors pick dark gray / gray / white by a value
    ///   adjusted down by half the saturation;
    /// - everything else picks the nearest of six hue sectors, dark when
    ///   value ≤ 0.75.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn approximate(color: Color) -> Self {
        if let Color::Indexed4(c) = color {
            return c;
        }
        let hsv = color.to_hsv();
        let (h, s, v) = (hsv.hue(), hsv.saturation(), hsv.value());

        if v < 0.30 {
            return Self::Black;
        }

        if s < 1.3 * (v - 0.25) && s < 0.4 {
            let adjusted = 0.5f32.mul_add(-s, v);
            return if adjusted < 0.55 {
                Self::DarkGray
            } else if adjusted < 0.85 {
                Self::Gray
            } else {
                Self::White
            };
        }

        // h is in [0, 360), so round(h / 60) is in 0..=6.
        let sector = ((h / 60.0).round() as usize) % HUE_SECTORS.len();
        let (dark, bright) = HUE_SECTORS[sector];
        if v <= 0.75 { dark } else { bright }
    }

    /// Exhaustive nearest match: the palette entry minimizing Euclidean
    /// distance in squared-RGB space. Ties go to the lower index.
    #[must_use]
    pub fn closest_to(color: Color) -> Self {
        let target = color.to_rgb().clamped().squared();
        let mut best = Self::Black;
        let mut best_dist = f32::MAX;
        for candidate in Self::ALL {
            let dist = candidate.to_rgb8().to_rgb().squared().distance_sq(target);
            if dist < best_dist {
                best_dist = dist;
                best = candidate;
            }
        }
        best
    }
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A color in any of the five supported representations.
///
/// # Examples
///
/// ```
/// use ditherterm::color::{Color, Rgb8};
///
/// let red = Color::rgb(1.0, 0.0, 0.0);
/// assert_eq!(red.to_rgb8(), Rgb8::new(255, 0, 0));
///
/// let mut cell = Color::ansi256(0);
/// cell.approximate(red);
/// assert_eq!(cell, Color::ansi256(196));
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Color {
    Rgb(Rgb),
    Hsv(Hsv),
    Indexed4(Ansi16),
    Indexed8(u8),
    Indexed24(Rgb8),
}

impl Color {
    pub const BLACK: Self = Self::Indexed4(Ansi16::Black);
    pub const RED: Self = Self::Indexed4(Ansi16::Red);
    pub const GREEN: Self = Self::Indexed4(Ansi16::Green);
    pub const YELLOW: Self = Self::Indexed4(Ansi16::Yellow);
    pub const BLUE: Self = Self::Indexed4(Ansi16::Blue);
    pub const MAGENTA: Self = Self::Indexed4(Ansi16::Magenta);
    pub const CYAN: Self = Self::Indexed4(Ansi16::Cyan);
    pub const GRAY: Self = Self::Indexed4(Ansi16::Gray);
    pub const DARK_GRAY: Self = Self::Indexed4(Ansi16::DarkGray);
    pub const BRIGHT_RED: Self = Self::Indexed4(Ansi16::BrightRed);
    pub const BRIGHT_GREEN: Self = Self::Indexed4(Ansi16::BrightGreen);
    pub const BRIGHT_YELLOW: Self = Self::Indexed4(Ansi16::BrightYellow);
    pub const BRIGHT_BLUE: Self = Self::Indexed4(Ansi16::BrightBlue);
    pub const BRIGHT_MAGENTA: Self = Self::Indexed4(Ansi16::BrightMagenta);
    pub const BRIGHT_CYAN: Self = Self::Indexed4(Ansi16::BrightCyan);
    pub const WHITE: Self = Self::Indexed4(Ansi16::White);

    // ─── Constructors ────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::Rgb(Rgb::new(r, g, b))
    }

    #[inline]
    #[must_use]
    pub fn hsv(h: f32, s: f32, v: f32) -> Self {
        Self::Hsv(Hsv::new(h, s, v))
    }

    #[inline]
    #[must_use]
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::Indexed24(Rgb8::new(r, g, b))
    }

    /// 16-color palette entry by id.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if `id > 15`.
    pub fn ansi16(id: u8) -> Result<Self> {
        Ansi16::from_index(id).map(Self::Indexed4)
    }

    #[inline]
    #[must_use]
    pub const fn ansi256(id: u8) -> Self {
        Self::Indexed8(id)
    }

    /// Entry of the 6×6×6 color cube of the 256-color palette.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if any coordinate is above 5.
    pub fn cube(r6: u8, g6: u8, b6: u8) -> Result<Self> {
        palette::cube_index(r6, g6, b6).map(Self::Indexed8)
    }

    /// Entry of the 24-step grayscale ramp of the 256-color palette.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if `step > 23`.
    pub fn gray(step: u8) -> Result<Self> {
        palette::gray_index(step).map(Self::Indexed8)
    }

    /// Parse `#RGB` or `#RRGGBB` (the `#` is optional) into a 24-bit color.
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        parse_hex(s).map(Self::Indexed24)
    }

    // ─── Conversions ─────────────────────────────────────────────────────

    /// Continuous RGB. Exact for continuous colors, the palette value for
    /// indexed ones.
    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        match self {
            Self::Rgb(c) => c,
            Self::Hsv(c) => c.to_rgb(),
            Self::Indexed4(c) => c.to_rgb8().to_rgb(),
            Self::Indexed8(idx) => palette::ansi256_to_rgb(idx).to_rgb(),
            Self::Indexed24(c) => c.to_rgb(),
        }
    }

    #[must_use]
    pub fn to_hsv(self) -> Hsv {
        match self {
            Self::Hsv(c) => c,
            other => other.to_rgb().to_hsv(),
        }
    }

    /// Overwrite this color with the best representation of `from` in this
    /// color's own variant.
    pub fn approximate(&mut self, from: Self) {
        *self = match *self {
            Self::Rgb(_) => Self::Rgb(from.to_rgb()),
            Self::Hsv(_) => Self::Hsv(from.to_hsv()),
            Self::Indexed4(_) => Self::Indexed4(Ansi16::approximate(from)),
            Self::Indexed8(_) => Self::Indexed8(palette::approximate_256(from)),
            Self::Indexed24(_) => Self::Indexed24(Rgb8::approximate(from)),
        };
    }

    /// `self` converted into `template`'s representation.
    #[must_use]
    pub fn approximated_as(self, template: Self) -> Self {
        let mut out = template;
        out.approximate(self);
        out
    }

    #[must_use]
    pub fn to_ansi16(self) -> Ansi16 {
        Ansi16::approximate(self)
    }

    #[must_use]
    pub fn to_ansi256(self) -> u8 {
        palette::approximate_256(self)
    }

    #[must_use]
    pub fn to_rgb8(self) -> Rgb8 {
        Rgb8::approximate(self)
    }
}

impl Default for Color {
    /// Default is 16-color black.
    fn default() -> Self {
        Self::BLACK
    }
}

/// Cross-variant equality converts `other` into `self`'s representation
/// first, so it is not symmetric across variants: `BrightRed ==
/// RGB(0.9, 0, 0)` holds while `RGB(0.9, 0, 0) == BrightRed` does not.
impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        match (*self, other.approximated_as(*self)) {
            (Self::Rgb(a), Self::Rgb(b)) => a.approx_eq(b),
            (Self::Hsv(a), Self::Hsv(b)) => a.approx_eq(b),
            (Self::Indexed4(a), Self::Indexed4(b)) => a == b,
            (Self::Indexed8(a), Self::Indexed8(b)) => a == b,
            (Self::Indexed24(a), Self::Indexed24(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indexed4(c) => write!(f, "ansi16({})", c.index()),
            Self::Indexed8(idx) => write!(f, "ansi256({idx})"),
            other => {
                let Rgb8 { r, g, b } = other.to_rgb8();
                write!(f, "#{r:02x}{g:02x}{b:02x}")
            }
        }
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Self::Rgb(c)
    }
}

impl From<Hsv> for Color {
    fn from(c: Hsv) -> Self {
        Self::Hsv(c)
    }
}

impl From<Ansi16> for Color {
    fn from(c: Ansi16) -> Self {
        Self::Indexed4(c)
    }
}

impl From<Rgb8> for Color {
    fn from(c: Rgb8) -> Self {
        Self::Indexed24(c)
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Clamp to `[0, 1]`; NaN becomes 0.
#[inline]
fn unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Wrap a hue into `[0, 360)`. Non-finite hues become 0.
#[inline]
fn normalize_hue(h: f32) -> f32 {
    if !h.is_finite() {
        return 0.0;
    }
    let h = h.rem_euclid(360.0);
    // rem_euclid of a tiny negative can round up to exactly 360.
    if h >= 360.0 { 0.0 } else { h }
}

/// Absolute hue difference (shortest arc on the color wheel).
#[inline]
fn hue_diff(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % 360.0;
    if d > 180.0 { 360.0 - d } else { d }
}

/// `[0, 1]` → byte, truncating.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(v: f32) -> u8 {
    // Callers pass clamped values, so the product is within 0..=255.
    (v * 255.0) as u8
}

fn parse_hex(s: &str) -> Option<Rgb8> {
    let s = s.strip_prefix('#').unwrap_or(s);
    let bytes = s.as_bytes();

    match bytes.len() {
        3 => {
            let r = parse_hex_digit(bytes[0])?;
            let g = parse_hex_digit(bytes[1])?;
            let b = parse_hex_digit(bytes[2])?;
            Some(Rgb8::new(r << 4 | r, g << 4 | g, b << 4 | b))
        }
        6 => Some(Rgb8::new(
            parse_hex_byte(&bytes[0..2])?,
            parse_hex_byte(&bytes[2..4])?,
            parse_hex_byte(&bytes[4..6])?,
        )),
        _ => None,
    }
}

#[inline]
const fn parse_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn parse_hex_byte(bytes: &[u8]) -> Option<u8> {
    let hi = parse_hex_digit(bytes[0])?;
    let lo = parse_hex_digit(bytes[1])?;
    Some(hi << 4 | lo)
}

// ─── Palettes ────────────────────────────────────────────────────────────────

pub mod palette {
    //! Palette tables and 256-color quantization.
    //!
    //! The 256-color palette consists of:
    //! - 0–15: the 16 base colors ([`ANSI16_RGB`])
    //! - 16–231: a 6×6×6 RGB cube
    //! - 232–255: a 24-step grayscale ramp

    use super::{Color, Rgb8};
    use crate::error::{Error, Result};

    /// Reference RGB values for the 16 base colors (VGA-style levels).
    pub const ANSI16_RGB: [Rgb8; 16] = [
        Rgb8::new(0, 0, 0),       // 0: Black
        Rgb8::new(128, 0, 0),     // 1: Red
        Rgb8::new(0, 128, 0),     // 2: Green
        Rgb8::new(128, 128, 0),   // 3: Yellow
        Rgb8::new(0, 0, 128),     // 4: Blue
        Rgb8::new(128, 0, 128),   // 5: Magenta
        Rgb8::new(0, 128, 128),   // 6: Cyan
        Rgb8::new(192, 192, 192), // 7: Gray
        Rgb8::new(128, 128, 128), // 8: Dark gray
        Rgb8::new(255, 0, 0),     // 9: Bright red
        Rgb8::new(0, 255, 0),     // 10: Bright green
        Rgb8::new(255, 255, 0),   // 11: Bright yellow
        Rgb8::new(0, 0, 255),     // 12: Bright blue
        Rgb8::new(255, 0, 255),   // 13: Bright magenta
        Rgb8::new(0, 255, 255),   // 14: Bright cyan
        Rgb8::new(255, 255, 255), // 15: White
    ];

    pub const CUBE_OFFSET: u8 = 16;
    pub const GRAY_OFFSET: u8 = 232;
    pub const GRAY_STEPS: u8 = 24;

    /// Cube white, used when the grayscale ramp runs off its top end.
    pub const CUBE_WHITE: u8 = 231;

    /// Palette index of cube coordinate `(r6, g6, b6)`.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if any coordinate is above 5.
    pub fn cube_index(r6: u8, g6: u8, b6: u8) -> Result<u8> {
        for c in [r6, g6, b6] {
            if c > 5 {
                return Err(Error::range("cube coordinate", c, 5u8));
            }
        }
        Ok(CUBE_OFFSET + 36 * r6 + 6 * g6 + b6)
    }

    /// Palette index of grayscale ramp step `step`.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if `step > 23`.
    pub fn gray_index(step: u8) -> Result<u8> {
        if step >= GRAY_STEPS {
            return Err(Error::range("grayscale step", step, GRAY_STEPS - 1));
        }
        Ok(GRAY_OFFSET + step)
    }

    /// RGB value of a 256-color palette index.
    #[must_use]
    pub const fn ansi256_to_rgb(idx: u8) -> Rgb8 {
        match idx {
            0..=15 => ANSI16_RGB[idx as usize],
            16..=231 => {
                let i = idx - CUBE_OFFSET;
                Rgb8::new(cube_level(i / 36), cube_level((i % 36) / 6), cube_level(i % 6))
            }
            232..=255 => {
                let v = 8 + 10 * (idx - GRAY_OFFSET);
                Rgb8::new(v, v, v)
            }
        }
    }

    /// Cube channel levels: 0, 95, 135, 175, 215, 255.
    const fn cube_level(i: u8) -> u8 {
        if i == 0 { 0 } else { 55 + 40 * i }
    }

    /// Quantize any color to the 256-color palette.
    ///
    /// Achromatic colors go through a `value^0.9` curve onto the grayscale
    /// ramp (cube white when the curve runs past the last step); everything
    /// else is quantized channel-wise onto the 6-level cube.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn approximate_256(color: Color) -> u8 {
        if let Color::Indexed8(idx) = color {
            return idx;
        }

        let hsv = color.to_hsv();
        if hsv.saturation() <= 0.0 {
            // value is clamped to [0, 1], so the step is in 0..=24.
            let step = (hsv.value().powf(0.9) * f32::from(GRAY_STEPS)).round() as u8;
            return if step >= GRAY_STEPS {
                CUBE_WHITE
            } else {
                GRAY_OFFSET + step
            };
        }

        let c = color.to_rgb().clamped();
        let q = |v: f32| (v * 5.0).round() as u8;
        CUBE_OFFSET + 36 * q(c.r) + 6 * q(c.g) + q(c.b)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
        (a - b).abs() <= epsilon
    }

    // ── RGB ↔ HSV ────────────────────────────────────────────────────────

    #[test]
    fn rgb_hsv_roundtrip_for_saturated_colors() {
        let steps = [0.0, 0.1, 0.25, 0.4, 0.5, 0.66, 0.8, 0.95, 1.0];
        for &r in &steps {
            for &g in &steps {
                for &b in &steps {
                    let rgb = Rgb::new(r, g, b);
                    let hsv = rgb.to_hsv();
                    if hsv.saturation() <= 0.0 {
                        continue;
                    }
                    let back = hsv.to_rgb();
                    assert!(
                        approx_eq(rgb.r, back.r, 1e-4)
                            && approx_eq(rgb.g, back.g, 1e-4)
                            && approx_eq(rgb.b, back.b, 1e-4),
                        "roundtrip failed for {rgb:?}: {hsv:?} -> {back:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn primaries_have_expected_hues() {
        assert!(approx_eq(Rgb::new(1.0, 0.0, 0.0).to_hsv().hue(), 0.0, 1e-4));
        assert!(approx_eq(Rgb::new(1.0, 1.0, 0.0).to_hsv().hue(), 60.0, 1e-4));
        assert!(approx_eq(Rgb::new(0.0, 1.0, 0.0).to_hsv().hue(), 120.0, 1e-4));
        assert!(approx_eq(Rgb::new(0.0, 1.0, 1.0).to_hsv().hue(), 180.0, 1e-4));
        assert!(approx_eq(Rgb::new(0.0, 0.0, 1.0).to_hsv().hue(), 240.0, 1e-4));
        assert!(approx_eq(Rgb::new(1.0, 0.0, 1.0).to_hsv().hue(), 300.0, 1e-4));
    }

    #[test]
    fn black_has_zero_saturation() {
        let hsv = Rgb::new(0.0, 0.0, 0.0).to_hsv();
        assert!(approx_eq(hsv.saturation(), 0.0, 1e-6));
        assert!(approx_eq(hsv.value(), 0.0, 1e-6));
    }

    #[test]
    fn hue_is_normalized_for_any_input() {
        let inputs = [
            -720.5,
            -360.0,
            -1e-7,
            0.0,
            359.999_99,
            360.0,
            725.0,
            1e9,
            f32::NAN,
            f32::INFINITY,
            f32::NEG_INFINITY,
        ];
        for h in inputs {
            let hue = Hsv::new(h, 0.5, 0.5).hue();
            assert!((0.0..360.0).contains(&hue), "hue {h} normalized to {hue}");
        }
        assert!(approx_eq(Hsv::new(-30.0, 1.0, 1.0).hue(), 330.0, 1e-3));
        assert!(approx_eq(Hsv::new(400.0, 1.0, 1.0).hue(), 40.0, 1e-3));
    }

    #[test]
    fn hsv_clamps_saturation_and_value() {
        let hsv = Hsv::new(10.0, 2.0, f32::NAN);
        assert!(approx_eq(hsv.saturation(), 1.0, 1e-6));
        assert!(approx_eq(hsv.value(), 0.0, 1e-6));
    }

    #[test]
    fn out_of_range_rgb_is_clamped_before_hsv() {
        let hsv = Rgb::new(2.0, -1.0, f32::NAN).to_hsv();
        assert!(approx_eq(hsv.hue(), 0.0, 1e-4));
        assert!(approx_eq(hsv.value(), 1.0, 1e-6));
        assert!(approx_eq(hsv.saturation(), 1.0, 1e-6));
    }

    // ── Indexed24 ────────────────────────────────────────────────────────

    #[test]
    fn indexed24_from_pure_red_and_black() {
        let mut c = Color::rgb8(9, 9, 9);
        c.approximate(Color::rgb(1.0, 0.0, 0.0));
        assert!(matches!(c, Color::Indexed24(Rgb8 { r: 255, g: 0, b: 0 })));

        c.approximate(Color::rgb(0.0, 0.0, 0.0));
        assert!(matches!(c, Color::Indexed24(Rgb8 { r: 0, g: 0, b: 0 })));
    }

    #[test]
    fn indexed24_truncates() {
        assert_eq!(Color::rgb(0.5, 0.999, 0.0).to_rgb8(), Rgb8::new(127, 254, 0));
    }

    #[test]
    fn indexed24_clamps_out_of_range() {
        assert_eq!(Color::rgb(3.0, -2.0, f32::NAN).to_rgb8(), Rgb8::new(255, 0, 0));
    }

    // ── Indexed4 ─────────────────────────────────────────────────────────

    #[test]
    fn ansi16_heuristic_dark_values_are_black() {
        assert_eq!(Ansi16::approximate(Color::rgb(0.29, 0.0, 0.0)), Ansi16::Black);
        assert_eq!(Ansi16::approximate(Color::rgb(0.1, 0.1, 0.1)), Ansi16::Black);
    }

    #[test]
    fn ansi16_heuristic_grays() {
        assert_eq!(Ansi16::approximate(Color::rgb(0.5, 0.5, 0.5)), Ansi16::DarkGray);
        assert_eq!(Ansi16::approximate(Color::rgb(0.75, 0.75, 0.75)), Ansi16::Gray);
        assert_eq!(Ansi16::approximate(Color::rgb(1.0, 1.0, 1.0)), Ansi16::White);
    }

    #[test]
    fn ansi16_heuristic_hue_sectors() {
        assert_eq!(Ansi16::approximate(Color::rgb(1.0, 0.0, 0.0)), Ansi16::BrightRed);
        assert_eq!(Ansi16::approximate(Color::rgb(0.6, 0.0, 0.0)), Ansi16::Red);
        assert_eq!(Ansi16::approximate(Color::hsv(58.0, 1.0, 1.0)), Ansi16::BrightYellow);
        assert_eq!(Ansi16::approximate(Color::hsv(125.0, 0.9, 0.5)), Ansi16::Green);
        assert_eq!(Ansi16::approximate(Color::hsv(185.0, 1.0, 0.9)), Ansi16::BrightCyan);
        assert_eq!(Ansi16::approximate(Color::hsv(240.0, 1.0, 0.5)), Ansi16::Blue);
        assert_eq!(Ansi16::approximate(Color::hsv(300.0, 1.0, 1.0)), Ansi16::BrightMagenta);
        // 350° rounds to sector 6, which wraps back to red.
        assert_eq!(Ansi16::approximate(Color::hsv(350.0, 1.0, 1.0)), Ansi16::BrightRed);
    }

    #[test]
    fn ansi16_heuristic_is_identity_on_palette() {
        for c in Ansi16::ALL {
            let as_24bit = Color::Indexed24(c.to_rgb8());
            assert_eq!(Ansi16::approximate(as_24bit), c);
        }
    }

    #[test]
    fn ansi16_closest_matches_palette_exactly() {
        for c in Ansi16::ALL {
            let Rgb8 { r, g, b } = c.to_rgb8();
            assert_eq!(Ansi16::closest_to(Color::rgb8(r, g, b)), c);
        }
    }

    #[test]
    fn ansi16_policies_can_disagree() {
        // Dark orange sits at hue 30°, which rounds into the yellow sector;
        // the exhaustive squared-RGB search prefers dark red.
        let orange = Color::rgb(0.7, 0.35, 0.0);
        assert_eq!(Ansi16::approximate(orange), Ansi16::Yellow);
        assert_eq!(Ansi16::closest_to(orange), Ansi16::Red);
    }

    #[test]
    fn ansi16_from_index_range() {
        assert_eq!(Ansi16::from_index(9).unwrap(), Ansi16::BrightRed);
        assert!(matches!(Ansi16::from_index(16), Err(Error::Range { .. })));
        assert!(Color::ansi16(15).is_ok());
        assert!(Color::ansi16(200).is_err());
    }

    // ── Indexed8 ─────────────────────────────────────────────────────────

    #[test]
    fn ansi256_cube_quantization() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.0).to_ansi256(), 196);
        assert_eq!(Color::rgb(0.0, 0.0, 1.0).to_ansi256(), 21);
        assert_eq!(Color::rgb(0.2, 0.6, 1.0).to_ansi256(), 16 + 36 + 6 * 3 + 5);
    }

    #[test]
    fn ansi256_grays_use_ramp() {
        assert_eq!(Color::rgb(0.0, 0.0, 0.0).to_ansi256(), 232);
        let mid = Color::rgb(0.5, 0.5, 0.5).to_ansi256();
        assert!((232..=255).contains(&mid), "mid gray mapped to {mid}");
    }

    #[test]
    fn ansi256_white_falls_back_to_cube_white() {
        assert_eq!(Color::rgb(1.0, 1.0, 1.0).to_ansi256(), palette::CUBE_WHITE);
    }

    #[test]
    fn ansi256_palette_values() {
        assert_eq!(palette::ansi256_to_rgb(0), Rgb8::new(0, 0, 0));
        assert_eq!(palette::ansi256_to_rgb(196), Rgb8::new(255, 0, 0));
        assert_eq!(palette::ansi256_to_rgb(231), Rgb8::new(255, 255, 255));
        assert_eq!(palette::ansi256_to_rgb(232), Rgb8::new(8, 8, 8));
        assert_eq!(palette::ansi256_to_rgb(255), Rgb8::new(238, 238, 238));
    }

    #[test]
    fn cube_and_gray_constructors_check_range() {
        assert!(matches!(Color::cube(5, 0, 0), Ok(Color::Indexed8(196))));
        assert!(matches!(Color::cube(0, 6, 0), Err(Error::Range { .. })));
        assert!(matches!(Color::gray(23), Ok(Color::Indexed8(255))));
        assert!(matches!(Color::gray(24), Err(Error::Range { .. })));
    }

    // ── approximate / equality ───────────────────────────────────────────

    #[test]
    fn approximate_keeps_receiver_variant() {
        let mut c = Color::hsv(0.0, 0.0, 0.0);
        c.approximate(Color::rgb(0.0, 1.0, 0.0));
        assert!(matches!(c, Color::Hsv(_)));
        assert!(approx_eq(c.to_hsv().hue(), 120.0, 1e-3));

        let mut c = Color::rgb(0.0, 0.0, 0.0);
        c.approximate(Color::WHITE);
        assert_eq!(c, Color::rgb(1.0, 1.0, 1.0));
    }

    #[test]
    fn approximate_does_not_mutate_source() {
        let source = Color::rgb(0.3, 0.6, 0.9);
        let mut target = Color::BLACK;
        target.approximate(source);
        assert!(matches!(source, Color::Rgb(Rgb { r, .. }) if approx_eq(r, 0.3, 1e-6)));
    }

    #[test]
    fn cross_variant_equality_converts_other_operand() {
        assert_eq!(Color::BRIGHT_RED, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::rgb8(255, 0, 0), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::ansi256(196), Color::rgb8(255, 0, 0));
        assert_ne!(Color::RED, Color::BRIGHT_RED);
    }

    #[test]
    fn hsv_equality_ignores_hue_of_grays() {
        assert_eq!(Color::hsv(0.0, 0.0, 0.5), Color::hsv(200.0, 0.0, 0.5));
    }

    // ── Hex / Display ────────────────────────────────────────────────────

    #[test]
    fn hex_parsing() {
        assert!(matches!(Color::hex("#ff8000"), Some(Color::Indexed24(Rgb8 { r: 255, g: 128, b: 0 }))));
        assert!(matches!(Color::hex("f80"), Some(Color::Indexed24(Rgb8 { r: 255, g: 136, b: 0 }))));
        assert!(Color::hex("#12345").is_none());
        assert!(Color::hex("zzz").is_none());
    }

    #[test]
    fn display_formats() {
        assert_eq!(Color::rgb8(200, 100, 50).to_string(), "#c86432");
        assert_eq!(Color::BRIGHT_RED.to_string(), "ansi16(9)");
        assert_eq!(Color::ansi256(42).to_string(), "ansi256(42)");
    }
}
