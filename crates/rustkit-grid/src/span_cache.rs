//! Span cache for grid measurement.
//!
//! Children that occupy more than one track need the aggregate size of the
//! tracks they span. Many children usually share the same span (a header row
//! spanning every column, a column of cells spanning two rows), so the
//! aggregate is memoized per span.
//!
//! # Design
//!
//! Keys are structural: two children with the same start, count and axis share
//! one entry no matter which child asked first. There is no per-entry
//! eviction. The cache is cleared en masse by [`SpanCache::invalidate`], which
//! the owning grid calls whenever the track list, a track definition, a span
//! assignment or the resolved fixed/auto sizes change.
//!
//! The cache is owned by a single grid and mutated through `&mut self`; it is
//! never shared across threads.
//!
//! # Usage
//!
//! ```ignore
//! let key = SpanKey::new(1, 2, Axis::Column);
//! let spanned = cache.get_or_compute(key, |key| measure_span(&columns, key));
//! ```

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::track::{SizeMode, Track};
use crate::Axis;

/// Structural identity of a span: first track, track count and axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanKey {
    pub start: usize,
    pub count: usize,
    pub axis: Axis,
}

impl SpanKey {
    /// Create a key. A zero count is treated as a single-track span.
    pub fn new(start: usize, count: usize, axis: Axis) -> Self {
        Self {
            start,
            count: count.max(1),
            axis,
        }
    }

    pub fn is_column_axis(&self) -> bool {
        self.axis.is_column()
    }

    /// One past the last spanned track.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.count)
    }
}

/// Aggregate size over the tracks of a span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanMeasurement {
    /// Sum of fixed and content-driven sizes across the span.
    pub size: f64,
    /// Number of spanned tracks that actually exist.
    pub tracks: usize,
}

/// Sum the resolved fixed and content-driven sizes across a span.
///
/// Proportional tracks contribute nothing. Tracks past the end of `tracks`
/// are skipped.
pub fn measure_span(tracks: &[Track], key: SpanKey) -> SpanMeasurement {
    let end = key.end().min(tracks.len());
    let in_range = tracks.get(key.start..end).unwrap_or(&[]);

    let size = in_range
        .iter()
        .filter(|t| matches!(t.mode, SizeMode::Fixed | SizeMode::ContentDriven))
        .map(|t| t.actual_size)
        .sum();

    SpanMeasurement {
        size,
        tracks: in_range.len(),
    }
}

/// Memoized span measurements for one grid.
#[derive(Debug, Default)]
pub struct SpanCache {
    entries: HashMap<SpanKey, SpanMeasurement>,
    /// Bumped on every invalidation.
    generation: u64,
    lookups: usize,
    hits: usize,
    stores: usize,
}

impl SpanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached measurement for `key`, computing and storing it on a
    /// miss.
    pub fn get_or_compute<F>(&mut self, key: SpanKey, compute: F) -> SpanMeasurement
    where
        F: FnOnce(SpanKey) -> SpanMeasurement,
    {
        self.lookups += 1;

        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            trace!(?key, size = cached.size, "span cache hit");
            return *cached;
        }

        let measured = compute(key);
        self.entries.insert(key, measured);
        self.stores += 1;
        trace!(?key, size = measured.size, "span cache store");
        measured
    }

    /// Drop every entry.
    pub fn invalidate(&mut self) {
        if !self.entries.is_empty() {
            debug!(
                generation = self.generation,
                entries = self.entries.len(),
                "span cache invalidated"
            );
        }
        self.entries.clear();
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache statistics as (lookups, hits, stores).
    pub fn stats(&self) -> (usize, usize, usize) {
        (self.lookups, self.hits, self.stores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn resolved(mut tracks: Vec<Track>) -> Vec<Track> {
        for track in &mut tracks {
            track.resolve_non_proportional();
        }
        tracks
    }

    #[test]
    fn test_zero_count_key_is_single_track() {
        let key = SpanKey::new(3, 0, Axis::Row);
        assert_eq!(key.count, 1);
        assert_eq!(key.end(), 4);
        assert!(!key.is_column_axis());
    }

    #[test]
    fn test_keys_compare_structurally() {
        assert_eq!(SpanKey::new(1, 2, Axis::Column), SpanKey::new(1, 2, Axis::Column));
        assert_ne!(SpanKey::new(1, 2, Axis::Column), SpanKey::new(1, 2, Axis::Row));
        assert_ne!(SpanKey::new(1, 2, Axis::Column), SpanKey::new(1, 3, Axis::Column));
        assert_ne!(SpanKey::new(1, 2, Axis::Column), SpanKey::new(0, 2, Axis::Column));
    }

    #[test]
    fn test_measure_span_sums_fixed_and_auto() {
        let mut auto = Track::auto();
        auto.desired_size = 30.0;
        let tracks = resolved(vec![Track::fixed(50.0), auto, Track::star(1.0), Track::fixed(20.0)]);

        let m = measure_span(&tracks, SpanKey::new(0, 4, Axis::Column));
        assert_eq!(m.size, 100.0);
        assert_eq!(m.tracks, 4);

        let m = measure_span(&tracks, SpanKey::new(1, 2, Axis::Column));
        assert_eq!(m.size, 30.0);
        assert_eq!(m.tracks, 2);
    }

    #[test]
    fn test_measure_span_out_of_range_is_zero() {
        let tracks = resolved(vec![Track::fixed(50.0), Track::fixed(25.0)]);

        let m = measure_span(&tracks, SpanKey::new(1, 5, Axis::Row));
        assert_eq!(m.size, 25.0);
        assert_eq!(m.tracks, 1);

        let m = measure_span(&tracks, SpanKey::new(9, 2, Axis::Row));
        assert_eq!(m.size, 0.0);
        assert_eq!(m.tracks, 0);
    }

    #[test]
    fn test_hit_does_not_recompute() {
        let mut cache = SpanCache::new();
        let calls = Cell::new(0);
        let key = SpanKey::new(0, 2, Axis::Column);
        let compute = |_| {
            calls.set(calls.get() + 1);
            SpanMeasurement { size: 1.0 / 3.0, tracks: 2 }
        };

        let first = cache.get_or_compute(key, compute);
        let second = cache.get_or_compute(key, compute);

        assert_eq!(calls.get(), 1);
        assert_eq!(first.size.to_bits(), second.size.to_bits());
        assert_eq!(cache.stats(), (2, 1, 1));
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let mut cache = SpanCache::new();
        let calls = Cell::new(0);
        let key = SpanKey::new(2, 1, Axis::Row);
        let compute = |_| {
            calls.set(calls.get() + 1);
            SpanMeasurement { size: 10.0, tracks: 1 }
        };

        cache.get_or_compute(key, compute);
        cache.get_or_compute(SpanKey::new(0, 3, Axis::Row), compute);
        assert_eq!(cache.len(), 2);

        let generation = cache.generation();
        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.generation(), generation + 1);

        cache.get_or_compute(key, compute);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_axis_separates_entries() {
        let mut cache = SpanCache::new();
        cache.get_or_compute(SpanKey::new(0, 1, Axis::Column), |_| SpanMeasurement { size: 5.0, tracks: 1 });
        let row = cache.get_or_compute(SpanKey::new(0, 1, Axis::Row), |_| SpanMeasurement { size: 9.0, tracks: 1 });

        assert_eq!(row.size, 9.0);
        assert_eq!(cache.len(), 2);
    }
}
