// SPDX-License-Identifier: MIT
//
// Error taxonomy.
//
// Every failure in this crate is a programmer-contract violation (bad
// dimensions, bad coordinates, out-of-domain palette components, misuse of
// the dither table) or an irrecoverable platform condition. Nothing is
// retried internally; everything surfaces to the caller as one of these.

use std::io;

/// Misuse of the dither lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// `precompute` was called on an engine that already has a table.
    #[error("dither table is already precomputed")]
    AlreadyPrecomputed,
    /// `lookup` was called before any table was computed.
    #[error("dither table has not been precomputed")]
    NotPrecomputed,
}

/// Everything that can go wrong while building, painting, or flushing a grid.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid buffer dimensions {width}x{height}: both must be positive")]
    Dimension { width: u16, height: u16 },

    #[error("cell ({x}, {y}) is outside the {width}x{height} buffer")]
    Bounds {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },

    #[error("{what} {value} is outside [{min}, {max}]")]
    Range {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error(transparent)]
    State(#[from] StateError),

    #[error("console API call failed: {0}")]
    Platform(#[source] io::Error),

    #[error("output write failed: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build a [`Error::Range`] for an integer component.
    pub(crate) fn range(what: &'static str, value: impl Into<f64>, max: impl Into<f64>) -> Self {
        Self::Range {
            what,
            value: value.into(),
            min: 0.0,
            max: max.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
