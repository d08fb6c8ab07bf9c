//! Track model: declared sizing plus resolved geometry for one row or column.
//!
//! A [`Track`] is axis-agnostic. Its declared part (mode, value, bounds) comes
//! from a [`TrackDefinition`]; its resolved part (`desired_size`,
//! `actual_size`, `actual_offset`) is rewritten on every layout pass.
//!
//! The only behavior that lives here is clamping: every size assigned to a
//! track goes through [`Track::clamp`], which applies the maximum first and
//! the minimum last, so a minimum larger than the maximum wins.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::GridError;

/// How a track obtains its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeMode {
    /// Exact pixel size.
    Fixed,
    /// Sized to the largest child it contains.
    ContentDriven,
    /// Weighted share of the space left after fixed and content tracks.
    Proportional,
}

/// A declared track length.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawLength")]
pub enum GridLength {
    Pixel(f64),
    Auto,
    Star(f64),
}

impl GridLength {
    pub fn mode(&self) -> SizeMode {
        match self {
            GridLength::Pixel(_) => SizeMode::Fixed,
            GridLength::Auto => SizeMode::ContentDriven,
            GridLength::Star(_) => SizeMode::Proportional,
        }
    }

    /// Pixel size for fixed lengths, weight for star lengths, 0 for auto.
    pub fn value(&self) -> f64 {
        match self {
            GridLength::Pixel(px) => *px,
            GridLength::Auto => 0.0,
            GridLength::Star(weight) => *weight,
        }
    }
}

impl Default for GridLength {
    fn default() -> Self {
        GridLength::Star(1.0)
    }
}

impl fmt::Display for GridLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridLength::Pixel(px) => write!(f, "{}", px),
            GridLength::Auto => write!(f, "Auto"),
            GridLength::Star(weight) if *weight == 1.0 => write!(f, "*"),
            GridLength::Star(weight) => write!(f, "{}*", weight),
        }
    }
}

impl FromStr for GridLength {
    type Err = GridError;

    /// Parse `Auto`, `*`, `2.5*`, `40` or `40px`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let invalid = || GridError::InvalidTrackSize(s.to_string());

        if text == "auto" {
            return Ok(GridLength::Auto);
        }

        if let Some(weight) = text.strip_suffix('*') {
            if weight.trim().is_empty() {
                return Ok(GridLength::Star(1.0));
            }
            let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;
            return non_negative(weight).map(GridLength::Star).ok_or_else(invalid);
        }

        let px = text.strip_suffix("px").unwrap_or(&text).trim();
        let px: f64 = px.parse().map_err(|_| invalid())?;
        non_negative(px).map(GridLength::Pixel).ok_or_else(invalid)
    }
}

fn non_negative(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Wire form of a [`GridLength`]: either a bare pixel number or text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLength {
    Number(f64),
    Text(String),
}

impl TryFrom<RawLength> for GridLength {
    type Error = GridError;

    fn try_from(raw: RawLength) -> Result<Self, Self::Error> {
        match raw {
            RawLength::Number(px) => non_negative(px)
                .map(GridLength::Pixel)
                .ok_or_else(|| GridError::InvalidTrackSize(px.to_string())),
            RawLength::Text(text) => text.parse(),
        }
    }
}

/// A row or column declaration as supplied by the container's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrackDefinition {
    #[serde(default)]
    pub size: GridLength,
    #[serde(default)]
    pub min_size: f64,
    #[serde(default = "unbounded")]
    pub max_size: f64,
}

fn unbounded() -> f64 {
    f64::INFINITY
}

impl TrackDefinition {
    pub fn new(size: GridLength) -> Self {
        Self {
            size,
            min_size: 0.0,
            max_size: f64::INFINITY,
        }
    }

    pub fn with_min(mut self, min_size: f64) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_max(mut self, max_size: f64) -> Self {
        self.max_size = max_size;
        self
    }
}

impl Default for TrackDefinition {
    fn default() -> Self {
        Self::new(GridLength::default())
    }
}

impl From<GridLength> for TrackDefinition {
    fn from(size: GridLength) -> Self {
        Self::new(size)
    }
}

/// A resolved grid track.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Declared sizing mode.
    pub mode: SizeMode,
    /// Pixels when fixed, star weight when proportional, unused when auto.
    pub declared_value: f64,
    /// Inclusive lower bound.
    pub min_size: f64,
    /// Inclusive upper bound.
    pub max_size: f64,
    /// Largest content contribution (content-driven tracks only).
    pub desired_size: f64,
    /// Offset from the start of the grid.
    pub actual_offset: f64,
    /// Final size.
    pub actual_size: f64,
}

impl Track {
    /// Create a track from its declaration.
    ///
    /// Negative or NaN minimums become 0 and a NaN maximum becomes unbounded.
    pub fn new(definition: &TrackDefinition) -> Self {
        let (min_size, max_size) = sanitize_bounds(definition.min_size, definition.max_size);

        Self {
            mode: definition.size.mode(),
            declared_value: definition.size.value(),
            min_size,
            max_size,
            desired_size: 0.0,
            actual_offset: 0.0,
            actual_size: 0.0,
        }
    }

    pub fn fixed(px: f64) -> Self {
        Self::new(&TrackDefinition::new(GridLength::Pixel(px)))
    }

    pub fn auto() -> Self {
        Self::new(&TrackDefinition::new(GridLength::Auto))
    }

    pub fn star(weight: f64) -> Self {
        Self::new(&TrackDefinition::new(GridLength::Star(weight)))
    }

    /// Replace the bounds, cleaned up the same way as in [`Track::new`].
    pub fn with_bounds(mut self, min_size: f64, max_size: f64) -> Self {
        (self.min_size, self.max_size) = sanitize_bounds(min_size, max_size);
        self
    }

    pub fn is_proportional(&self) -> bool {
        self.mode == SizeMode::Proportional
    }

    /// Star weight if this track takes part in weighted distribution.
    pub fn star_weight(&self) -> Option<f64> {
        (self.is_proportional() && self.declared_value.is_finite() && self.declared_value > 0.0)
            .then_some(self.declared_value)
    }

    /// Clamp a size into `[min_size, max_size]`; the minimum is applied last.
    pub fn clamp(&self, size: f64) -> f64 {
        let size = if size.is_nan() { 0.0 } else { size };
        size.min(self.max_size).max(self.min_size)
    }

    /// Assign a clamped size and return what was stored.
    pub fn set_actual_size(&mut self, size: f64) -> f64 {
        self.actual_size = self.clamp(size);
        self.actual_size
    }

    /// Resolve a fixed or content-driven track. Proportional tracks are left
    /// for the star solver.
    pub fn resolve_non_proportional(&mut self) {
        match self.mode {
            SizeMode::Fixed => {
                self.set_actual_size(self.declared_value);
            }
            SizeMode::ContentDriven => {
                self.set_actual_size(self.desired_size);
            }
            SizeMode::Proportional => {}
        }
    }

    /// Offset of the far edge of this track.
    pub fn end(&self) -> f64 {
        self.actual_offset + self.actual_size
    }
}

/// Negative or NaN minimum becomes 0, NaN maximum becomes unbounded.
fn sanitize_bounds(min_size: f64, max_size: f64) -> (f64, f64) {
    let min_size = if min_size.is_nan() { 0.0 } else { min_size.max(0.0) };
    let max_size = if max_size.is_nan() { f64::INFINITY } else { max_size };
    (min_size, max_size)
}
