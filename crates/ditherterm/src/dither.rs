// SPDX-License-Identifier: MIT
//
// Dither approximation: arbitrary RGB out of 16 colors and a few shade glyphs.
//
// A shade glyph covers part of its cell with the foreground and leaves the
// rest background, so the cell reads as a blend of the two. The blend is
// modeled in squared space:
//
//   mix(fg, bg, o) = sqrt(o · fg² + (1 − o) · bg²)     per channel
//
// `precompute(r)` samples the unit RGB cube on an r × r × r grid and, for
// every sample, scores all 16 × 16 × |glyphs| (bg, fg, glyph) triples,
// keeping the one whose mixed color is nearest in squared space. Lookups
// then round a color onto the grid and read the stored triple.

use std::fmt;
use std::time::Instant;

use log::{debug, info};

use crate::color::{Ansi16, Color, Rgb};
use crate::error::{Error, Result, StateError};

/// Smallest grid that spans both ends of every channel.
pub const MIN_RESOLUTION: u16 = 2;

/// Upper bound on the grid resolution. 64³ samples is already far finer
/// than 16 colors can resolve.
pub const MAX_RESOLUTION: u16 = 64;

/// Resolution used when none is configured.
pub const DEFAULT_RESOLUTION: u16 = 8;

/// Glyph that requests the background color in dithered mode.
pub const BLANK_PROBE: char = ' ';

/// Glyph that requests the foreground color in dithered mode.
pub const SOLID_PROBE: char = '█';

// ─── DitherPreset ────────────────────────────────────────────────────────────

/// Glyphs available for dithering, each with the fraction of its cell the
/// foreground covers.
#[derive(Debug, Clone, PartialEq)]
pub struct DitherPreset {
    glyphs: Vec<(char, f32)>,
}

impl DitherPreset {
    /// # Errors
    ///
    /// [`Error::Range`] if the preset is empty or an opacity is outside
    /// `[0, 1]`.
    pub fn new(glyphs: impl IntoIterator<Item = (char, f32)>) -> Result<Self> {
        let glyphs: Vec<(char, f32)> = glyphs.into_iter().collect();
        if glyphs.is_empty() {
            return Err(Error::Range {
                what: "preset glyph count",
                value: 0.0,
                min: 1.0,
                max: f64::from(u32::MAX),
            });
        }
        for &(_, opacity) in &glyphs {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(Error::range("glyph opacity", opacity, 1.0f32));
            }
        }
        Ok(Self { glyphs })
    }

    #[must_use]
    pub fn glyphs(&self) -> &[(char, f32)] {
        &self.glyphs
    }

    #[must_use]
    pub fn opacity(&self, glyph: char) -> Option<f32> {
        self.glyphs
            .iter()
            .find_map(|&(g, o)| (g == glyph).then_some(o))
    }
}

impl Default for DitherPreset {
    /// Blank, light, medium and dark shade.
    fn default() -> Self {
        Self {
            glyphs: vec![(' ', 0.0), ('░', 0.25), ('▒', 0.5), ('▓', 0.75)],
        }
    }
}

// ─── Dither ──────────────────────────────────────────────────────────────────

/// A glyph drawn in a foreground over a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dither {
    pub glyph: char,
    pub fg: Ansi16,
    pub bg: Ansi16,
}

/// Blend `fg` over `bg` at `opacity` in squared space.
#[must_use]
pub fn mix(fg: Rgb, bg: Rgb, opacity: f32) -> Rgb {
    let blend = |f: f32, b: f32| (opacity * f * f + (1.0 - opacity) * b * b).sqrt();
    Rgb::new(blend(fg.r, bg.r), blend(fg.g, bg.g), blend(fg.b, bg.b))
}

// ─── DitherEngine ────────────────────────────────────────────────────────────

struct Table {
    resolution: u16,
    entries: Vec<Dither>,
}

impl Table {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn slot(&self, rgb: Rgb) -> usize {
        let top = f32::from(self.resolution - 1);
        let q = |c: f32| (c * top).round() as usize;
        let r = usize::from(self.resolution);
        (q(rgb.r) * r + q(rgb.g)) * r + q(rgb.b)
    }
}

/// A preset plus its lazily computed lookup table.
///
/// The table is computed at most once per engine and never changes after.
pub struct DitherEngine {
    preset: DitherPreset,
    table: Option<Table>,
}

impl DitherEngine {
    #[must_use]
    pub const fn new(preset: DitherPreset) -> Self {
        Self {
            preset,
            table: None,
        }
    }

    #[must_use]
    pub const fn preset(&self) -> &DitherPreset {
        &self.preset
    }

    #[must_use]
    pub const fn is_precomputed(&self) -> bool {
        self.table.is_some()
    }

    /// Grid resolution of the table, once computed.
    #[must_use]
    pub fn resolution(&self) -> Option<u16> {
        self.table.as_ref().map(|t| t.resolution)
    }

    /// The color a cell showing `glyph` in `fg` over `bg` reads as.
    ///
    /// `None` if `glyph` is not part of this engine's preset.
    #[must_use]
    pub fn mix(&self, fg: Color, bg: Color, glyph: char) -> Option<Rgb> {
        let opacity = self.preset.opacity(glyph)?;
        Some(mix(fg.to_rgb().clamped(), bg.to_rgb().clamped(), opacity))
    }

    /// Build the `resolution³` lookup table.
    ///
    /// Cost grows with `resolution³ · 256 · glyphs`; 6 to 8 keeps startup
    /// well under a frame budget.
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadyPrecomputed`] on a second call, [`Error::Range`]
    /// if `resolution` is outside `[MIN_RESOLUTION, MAX_RESOLUTION]`.
    pub fn precompute(&mut self, resolution: u16) -> Result<()> {
        if self.table.is_some() {
            return Err(StateError::AlreadyPrecomputed.into());
        }
        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
            return Err(Error::Range {
                what: "dither resolution",
                value: f64::from(resolution),
                min: f64::from(MIN_RESOLUTION),
                max: f64::from(MAX_RESOLUTION),
            });
        }

        let started = Instant::now();
        let candidates = self.candidates();
        let top = f32::from(resolution - 1);
        let steps: Vec<f32> = (0..resolution).map(|i| f32::from(i) / top).collect();

        let mut entries = Vec::with_capacity(steps.len().pow(3));
        for &r in &steps {
            for &g in &steps {
                for &b in &steps {
                    let target = Rgb::new(r, g, b).squared();
                    entries.push(nearest(&candidates, target));
                }
            }
        }

        info!(
            "dither table {resolution}^3 over {} candidates in {:?}",
            candidates.len(),
            started.elapsed()
        );
        self.table = Some(Table {
            resolution,
            entries,
        });
        Ok(())
    }

    /// Best triple for `color`.
    ///
    /// # Errors
    ///
    /// [`StateError::NotPrecomputed`] before [`precompute`](Self::precompute).
    pub fn lookup(&self, color: Color) -> Result<Dither> {
        let table = self.table.as_ref().ok_or(StateError::NotPrecomputed)?;
        let slot = table.slot(color.to_rgb().clamped());
        Ok(table.entries[slot])
    }

    /// Every (bg, fg, glyph) triple with its mixed color in squared space.
    fn candidates(&self) -> Vec<(Dither, Rgb)> {
        let mut out = Vec::with_capacity(16 * 16 * self.preset.glyphs.len());
        for bg in Ansi16::ALL {
            let bg_sq = bg.to_rgb8().to_rgb().squared();
            for fg in Ansi16::ALL {
                let fg_sq = fg.to_rgb8().to_rgb().squared();
                for &(glyph, o) in &self.preset.glyphs {
                    let mixed = Rgb::new(
                        o.mul_add(fg_sq.r, (1.0 - o) * bg_sq.r),
                        o.mul_add(fg_sq.g, (1.0 - o) * bg_sq.g),
                        o.mul_add(fg_sq.b, (1.0 - o) * bg_sq.b),
                    );
                    out.push((Dither { glyph, fg, bg }, mixed));
                }
            }
        }
        debug!("{} dither candidates", out.len());
        out
    }
}

impl Default for DitherEngine {
    fn default() -> Self {
        Self::new(DitherPreset::default())
    }
}

impl fmt::Debug for DitherEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DitherEngine")
            .field("preset", &self.preset)
            .field("resolution", &self.resolution())
            .finish()
    }
}

// First minimum wins.
fn nearest(candidates: &[(Dither, Rgb)], target: Rgb) -> Dither {
    let mut best = candidates[0].0;
    let mut best_dist = f32::MAX;
    for &(dither, mixed) in candidates {
        let dist = mixed.distance_sq(target);
        if dist < best_dist {
            best_dist = dist;
            best = dither;
        }
    }
    best
}

// ─── Tests ───────────────────────────────────────────────────────────────────
