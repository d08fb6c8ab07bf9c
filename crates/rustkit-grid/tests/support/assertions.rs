//! Custom assertions for grid integration tests.

use rustkit_grid::{Rect, Track};

/// Tolerance used when comparing resolved geometry.
pub const TOLERANCE: f64 = 0.01;

/// Assert that two lengths match within [`TOLERANCE`].
#[track_caller]
pub fn assert_near(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "Length mismatch: expected {}, got {} (tolerance: {})",
        expected,
        actual,
        TOLERANCE
    );
}

/// Assert that a rectangle matches within [`TOLERANCE`] on every edge.
#[track_caller]
pub fn assert_rect_near(actual: Rect, expected: Rect) {
    let close = (actual.x - expected.x).abs() < TOLERANCE
        && (actual.y - expected.y).abs() < TOLERANCE
        && (actual.width - expected.width).abs() < TOLERANCE
        && (actual.height - expected.height).abs() < TOLERANCE;

    assert!(
        close,
        "Rect mismatch: expected {:?}, got {:?} (tolerance: {})",
        expected, actual, TOLERANCE
    );
}

/// Assert that every track sits within its bounds and tracks are laid out
/// back to back from offset zero.
#[track_caller]
pub fn assert_tracks_consistent(tracks: &[Track]) {
    let mut offset = 0.0;
    for (i, track) in tracks.iter().enumerate() {
        assert!(
            track.actual_size >= track.min_size,
            "Track {} below minimum: {} < {}",
            i,
            track.actual_size,
            track.min_size
        );
        if track.min_size <= track.max_size {
            assert!(
                track.actual_size <= track.max_size,
                "Track {} above maximum: {} > {}",
                i,
                track.actual_size,
                track.max_size
            );
        }
        assert_near(track.actual_offset, offset);
        offset += track.actual_size;
    }
}
