// SPDX-License-Identifier: MIT
//
// ditherterm — cell-grid terminal renderer with 16-color dithering.
//
// A write-only rendering substrate: callers paint characters and colors into
// a fixed grid, then flush it. Four color fidelities (16, dithered 16, 256,
// truecolor) and two transports: escape-sequence text for any terminal, and
// a bulk console write where the platform has one.
//
// The text backend emits a color escape only when the color actually
// changes, so output size tracks color runs rather than cell count. The
// dither engine fakes the missing colors of a 16-color terminal with shade
// glyphs, picking the best (background, foreground, glyph) triple from a
// precomputed table.
//
// No scrollback, no input, no widgets.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod codepage;
pub mod color;
pub mod config;
pub mod console;
pub mod dither;
pub mod error;
pub mod output;
pub mod shapes;
pub mod sys;
pub mod terminal;
pub mod text;

pub use buffer::{Backend, ColorDepth, Flush, FrameBuffer};
pub use cell::Cell;
pub use color::{Ansi16, Color, Hsv, Rgb, Rgb8};
pub use config::{BackendPreference, ColorMode, PlatformErrorPolicy, TerminalConfig};
pub use dither::{Dither, DitherEngine, DitherPreset};
pub use error::{Error, Result, StateError};
pub use terminal::Terminal;
