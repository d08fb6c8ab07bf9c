//! # RustKit Grid
//!
//! Track sizing engine for grid containers.
//!
//! ## Overview
//!
//! A grid is a set of columns and rows, each declared as a fixed pixel size,
//! a content-driven ("auto") size or a proportional ("star") share of the
//! leftover space. Children occupy a rectangular span of tracks. A layout pass
//! resolves the size and offset of every track and from that the rectangle of
//! every child.
//!
//! The crate is split the same way the pass runs:
//!
//! 1. **Tracks** ([`track`]): declared sizing mode plus min/max clamping
//! 2. **Span cache** ([`span_cache`]): memoized span aggregates keyed by
//!    `(start, count, axis)`
//! 3. **Star distribution** ([`star`]): iterative proportional allocation
//!    under min/max bounds
//! 4. **Realized columns** ([`realized_columns`]): logical to realized index
//!    translation for column virtualization
//! 5. **Layout pass** ([`layout`]): measure, distribute, arrange
//!
//! ## Threading
//!
//! Everything here is synchronous and single-threaded. A [`GridLayout`] and
//! its span cache belong to one container and are driven through `&mut`
//! access by the thread running layout for that container.

pub mod layout;
pub mod realized_columns;
pub mod span_cache;
pub mod star;
pub mod track;

pub use layout::{ChildId, GridChild, GridDefinition, GridLayout, GridPlacement};
pub use realized_columns::{merge_blocks, RealizedColumns, RealizedColumnsBlock};
pub use span_cache::{measure_span, SpanCache, SpanKey, SpanMeasurement};
pub use star::{distribute, Distribution};
pub use track::{GridLength, SizeMode, Track, TrackDefinition};

use thiserror::Error;

/// Errors raised at the edges of the grid engine.
///
/// The layout pass itself never fails; these only come from parsing
/// declarations and loading grid descriptions.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid track size: {0}")]
    InvalidTrackSize(String),

    #[error("Invalid grid description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The two layout axes of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Column,
    Row,
}

impl Axis {
    pub fn is_column(self) -> bool {
        matches!(self, Axis::Column)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Extent along the given axis (width for columns, height for rows).
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Column => self.width,
            Axis::Row => self.height,
        }
    }
}

/// A 2D rectangle, relative to the grid origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}
