//! # Grid layout pass
//!
//! Drives one measure/arrange pass over a grid container.
//!
//! ## Algorithm
//!
//! For each axis:
//!
//! 1. Content-driven tracks start from zero and grow to the largest child that
//!    sits in that single track.
//! 2. Fixed and content-driven sizes are resolved. If any of them differs from
//!    the previous pass, the span cache is invalidated.
//! 3. Children spanning several tracks are grouped by span (largest extent
//!    wins) and processed from the narrowest span outwards. The span cache
//!    supplies the aggregate size already covered; any excess is split evenly
//!    across the content-driven tracks of the span. Spans that include a star
//!    track are left to the star tracks.
//! 4. Star tracks split the remaining space ([`crate::star::distribute`]) and
//!    offsets are assigned.
//!
//! Children are then arranged from the resolved offsets.
//!
//! ## Degraded input
//!
//! Nothing here fails. Spans that run past the last track are clamped into
//! range, zero spans count as one track, and a grid without declared rows or
//! columns gets a single implicit star track on that axis.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::span_cache::{measure_span, SpanCache, SpanKey};
use crate::star::distribute;
use crate::track::{SizeMode, Track, TrackDefinition};
use crate::{Axis, GridError, Rect, Size};

/// Index of a child within its grid.
pub type ChildId = usize;

/// Where a child sits in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GridPlacement {
    #[serde(default)]
    pub row: usize,
    #[serde(default)]
    pub column: usize,
    #[serde(default = "single_track")]
    pub row_span: usize,
    #[serde(default = "single_track")]
    pub column_span: usize,
}

fn single_track() -> usize {
    1
}

impl GridPlacement {
    pub fn new(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            row_span: 1,
            column_span: 1,
        }
    }

    pub fn with_span(mut self, row_span: usize, column_span: usize) -> Self {
        self.row_span = row_span;
        self.column_span = column_span;
        self
    }

    /// Declared (start, count) along an axis, before clamping.
    pub fn span(&self, axis: Axis) -> (usize, usize) {
        match axis {
            Axis::Column => (self.column, self.column_span),
            Axis::Row => (self.row, self.row_span),
        }
    }
}

impl Default for GridPlacement {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// A child as seen by the layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GridChild {
    pub placement: GridPlacement,
    /// Size requested by the child's own measurement.
    pub desired_size: Size,
    /// Arranged rectangle from the last pass.
    pub rect: Rect,
}

/// A child entry in a grid description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChildDefinition {
    #[serde(flatten)]
    pub placement: GridPlacement,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Serializable description of a grid: tracks plus children.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GridDefinition {
    #[serde(default)]
    pub columns: Vec<TrackDefinition>,
    #[serde(default)]
    pub rows: Vec<TrackDefinition>,
    #[serde(default)]
    pub children: Vec<ChildDefinition>,
}

impl GridDefinition {
    /// Parse a grid description from JSON.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a layout with every described child attached.
    pub fn build(&self) -> GridLayout {
        let mut grid = GridLayout::new(&self.columns, &self.rows);
        for child in &self.children {
            grid.add_child(child.placement, Size::new(child.width, child.height));
        }
        grid
    }
}

/// Grid layout state for one container.
#[derive(Debug)]
pub struct GridLayout {
    /// Column tracks.
    columns: Vec<Track>,
    /// Row tracks.
    rows: Vec<Track>,
    children: Vec<GridChild>,
    span_cache: SpanCache,
    /// Fixed/auto column sizes the span cache was last filled against.
    column_sizes: Vec<f64>,
    /// Fixed/auto row sizes the span cache was last filled against.
    row_sizes: Vec<f64>,
}

impl GridLayout {
    /// Create a grid from column and row declarations.
    pub fn new(columns: &[TrackDefinition], rows: &[TrackDefinition]) -> Self {
        Self {
            columns: build_tracks(columns),
            rows: build_tracks(rows),
            children: Vec::new(),
            span_cache: SpanCache::new(),
            column_sizes: Vec::new(),
            row_sizes: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Track] {
        &self.columns
    }

    pub fn rows(&self) -> &[Track] {
        &self.rows
    }

    pub fn tracks(&self, axis: Axis) -> &[Track] {
        match axis {
            Axis::Column => &self.columns,
            Axis::Row => &self.rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn children(&self) -> &[GridChild] {
        &self.children
    }

    pub fn span_cache(&self) -> &SpanCache {
        &self.span_cache
    }

    /// Replace every column declaration.
    pub fn set_columns(&mut self, columns: &[TrackDefinition]) {
        self.columns = build_tracks(columns);
        self.invalidate();
    }

    /// Replace every row declaration.
    pub fn set_rows(&mut self, rows: &[TrackDefinition]) {
        self.rows = build_tracks(rows);
        self.invalidate();
    }

    /// Replace one column declaration. Returns false when out of range.
    pub fn set_column(&mut self, index: usize, definition: &TrackDefinition) -> bool {
        self.set_track(Axis::Column, index, definition)
    }

    /// Replace one row declaration. Returns false when out of range.
    pub fn set_row(&mut self, index: usize, definition: &TrackDefinition) -> bool {
        self.set_track(Axis::Row, index, definition)
    }

    fn set_track(&mut self, axis: Axis, index: usize, definition: &TrackDefinition) -> bool {
        let tracks = match axis {
            Axis::Column => &mut self.columns,
            Axis::Row => &mut self.rows,
        };
        let Some(track) = tracks.get_mut(index) else {
            trace!(?axis, index, "ignoring definition for missing track");
            return false;
        };
        *track = Track::new(definition);
        self.invalidate();
        true
    }

    /// Attach a child.
    pub fn add_child(&mut self, placement: GridPlacement, desired_size: Size) -> ChildId {
        self.children.push(GridChild {
            placement,
            desired_size,
            rect: Rect::zero(),
        });
        self.invalidate();
        self.children.len() - 1
    }

    /// Move a child to a different span.
    pub fn set_placement(&mut self, id: ChildId, placement: GridPlacement) {
        if let Some(child) = self.children.get_mut(id) {
            if child.placement != placement {
                child.placement = placement;
                self.invalidate();
            }
        }
    }

    /// Update a child's measured size. Takes effect on the next pass.
    pub fn set_desired_size(&mut self, id: ChildId, desired_size: Size) {
        if let Some(child) = self.children.get_mut(id) {
            child.desired_size = desired_size;
        }
    }

    /// Force a full remeasure on the next pass.
    pub fn invalidate(&mut self) {
        self.span_cache.invalidate();
        self.column_sizes.clear();
        self.row_sizes.clear();
    }

    /// Resolve every track against the available space.
    ///
    /// Returns the total extent of the resolved tracks.
    pub fn measure(&mut self, available: Size) -> Size {
        let Self {
            columns,
            rows,
            children,
            span_cache,
            column_sizes,
            row_sizes,
        } = self;

        // Steps 1-2 on both axes before any cache lookup
        let column_spans = collect_contributions(Axis::Column, columns, children);
        let row_spans = collect_contributions(Axis::Row, rows, children);

        let current_columns = non_proportional_sizes(columns);
        let current_rows = non_proportional_sizes(rows);
        if *column_sizes != current_columns || *row_sizes != current_rows {
            span_cache.invalidate();
            *column_sizes = current_columns;
            *row_sizes = current_rows;
        }

        // Step 3
        let mut grew = false;
        grow_spanned_tracks(columns, column_spans, span_cache, &mut grew);
        grow_spanned_tracks(rows, row_spans, span_cache, &mut grew);
        if grew {
            // Entries now reflect grown sizes; the next pass starts over.
            column_sizes.clear();
            row_sizes.clear();
        }

        // Step 4
        let column_result = distribute(columns, available.width);
        let row_result = distribute(rows, available.height);

        let desired = Size::new(extent(columns), extent(rows));
        let (lookups, hits, stores) = span_cache.stats();

        debug!(
            "Grid measure complete: {} columns, {} rows, {} children -> {}x{} (span cache {}/{} hits, {} stores)",
            columns.len(),
            rows.len(),
            children.len(),
            desired.width,
            desired.height,
            hits,
            lookups,
            stores
        );
        trace!(
            column_passes = column_result.passes,
            row_passes = row_result.passes,
            unallocated_width = column_result.unallocated,
            unallocated_height = row_result.unallocated,
            "star distribution"
        );

        desired
    }

    /// Position every child from the resolved tracks.
    pub fn arrange(&mut self) -> Vec<Rect> {
        let columns = &self.columns;
        let rows = &self.rows;

        for child in &mut self.children {
            let (x, width) = span_geometry(columns, child.placement.span(Axis::Column));
            let (y, height) = span_geometry(rows, child.placement.span(Axis::Row));
            child.rect = Rect::new(x, y, width, height);

            trace!(
                "Child at (row {}, column {}) -> rect {:?}",
                child.placement.row,
                child.placement.column,
                child.rect
            );
        }

        self.children.iter().map(|child| child.rect).collect()
    }

    /// Measure then arrange.
    pub fn layout(&mut self, available: Size) -> Vec<Rect> {
        self.measure(available);
        self.arrange()
    }

    /// Arranged rectangle of a child from the last pass.
    pub fn child_rect(&self, id: ChildId) -> Option<Rect> {
        self.children.get(id).map(|child| child.rect)
    }
}

fn build_tracks(definitions: &[TrackDefinition]) -> Vec<Track> {
    if definitions.is_empty() {
        return vec![Track::new(&TrackDefinition::default())];
    }
    definitions.iter().map(Track::new).collect()
}

fn extent(tracks: &[Track]) -> f64 {
    tracks.last().map(Track::end).unwrap_or(0.0)
}

/// Clamp a declared span into the existing tracks.
fn clamp_span(span: (usize, usize), track_count: usize) -> (usize, usize) {
    let (start, count) = span;
    let start = start.min(track_count.saturating_sub(1));
    let count = count.max(1).min(track_count - start).max(1);
    (start, count)
}

/// Offset and extent covered by a span.
fn span_geometry(tracks: &[Track], span: (usize, usize)) -> (f64, f64) {
    if tracks.is_empty() {
        return (0.0, 0.0);
    }
    let (start, count) = clamp_span(span, tracks.len());
    let first = &tracks[start];
    let last = &tracks[start + count - 1];
    (first.actual_offset, last.end() - first.actual_offset)
}

/// A child's extent along an axis; negative and NaN become zero.
fn child_extent(child: &GridChild, axis: Axis) -> f64 {
    let extent = child.desired_size.along(axis);
    if extent.is_nan() {
        0.0
    } else {
        extent.max(0.0)
    }
}

/// Size content tracks from single-track children and resolve fixed/auto
/// sizes. Returns the largest extent requested per multi-track span, narrowest
/// spans first.
fn collect_contributions(axis: Axis, tracks: &mut [Track], children: &[GridChild]) -> Vec<(SpanKey, f64)> {
    for track in tracks.iter_mut() {
        track.desired_size = 0.0;
    }

    let mut requirements: HashMap<SpanKey, f64> = HashMap::new();
    for child in children {
        let (start, count) = clamp_span(child.placement.span(axis), tracks.len());
        let extent = child_extent(child, axis);

        if count == 1 {
            let track = &mut tracks[start];
            if track.mode == SizeMode::ContentDriven {
                track.desired_size = track.desired_size.max(extent);
            }
        } else {
            let required = requirements.entry(SpanKey::new(start, count, axis)).or_insert(0.0);
            *required = required.max(extent);
        }
    }

    for track in tracks.iter_mut() {
        track.resolve_non_proportional();
    }

    let mut requirements: Vec<(SpanKey, f64)> = requirements.into_iter().collect();
    requirements.sort_by_key(|(key, _)| (key.count, key.start));
    requirements
}

/// Split the part of each span requirement not yet covered by the span's
/// fixed/auto tracks across its content tracks. Sets `grew` if any track grew.
///
/// Each key is visited once per pass, so the cache only has to be cleared on
/// the first growth of the pass: entries stored after that belong to spans
/// that are not looked up again before the next pass starts over.
fn grow_spanned_tracks(
    tracks: &mut [Track],
    requirements: Vec<(SpanKey, f64)>,
    span_cache: &mut SpanCache,
    grew: &mut bool,
) {
    for (key, required) in requirements {
        if tracks[key.start..key.end()].iter().any(Track::is_proportional) {
            trace!(?key, "span includes star tracks; left to star distribution");
            continue;
        }

        let spanned = span_cache.get_or_compute(key, |key| measure_span(tracks, key));
        let excess = required - spanned.size;
        if excess <= 0.0 {
            continue;
        }

        let auto_tracks: Vec<usize> = (key.start..key.end())
            .filter(|&i| tracks[i].mode == SizeMode::ContentDriven)
            .collect();
        if auto_tracks.is_empty() {
            trace!(?key, excess, "no content tracks to absorb span excess");
            continue;
        }

        let per_track = excess / auto_tracks.len() as f64;
        for i in auto_tracks {
            let track = &mut tracks[i];
            track.desired_size = track.actual_size + per_track;
            track.resolve_non_proportional();
        }
        trace!(?key, excess, per_track, "span excess distributed");

        if !*grew {
            // Entries for spans not yet visited predate this growth.
            span_cache.invalidate();
            *grew = true;
        }
    }
}

fn non_proportional_sizes(tracks: &[Track]) -> Vec<f64> {
    tracks
        .iter()
        .map(|t| if t.is_proportional() { 0.0 } else { t.actual_size })
        .collect()
}
