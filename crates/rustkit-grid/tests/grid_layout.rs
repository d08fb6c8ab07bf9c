//! Integration tests for full grid layout passes.

mod support;

use rustkit_grid::{
    distribute, GridDefinition, GridLayout, GridLength, GridPlacement, Rect, Size, Track,
    TrackDefinition,
};
use support::{assert_near, assert_rect_near, assert_tracks_consistent, init_tracing};

fn def(size: GridLength) -> TrackDefinition {
    TrackDefinition::new(size)
}

/// A form-style grid: label column sized to content, field column taking the
/// rest, a header spanning both, a footer row of fixed height.
fn form_grid() -> GridLayout {
    let mut grid = GridLayout::new(
        &[def(GridLength::Auto), def(GridLength::Star(1.0)).with_min(100.0)],
        &[
            def(GridLength::Auto),
            def(GridLength::Auto),
            def(GridLength::Star(1.0)),
            def(GridLength::Pixel(32.0)),
        ],
    );

    grid.add_child(GridPlacement::new(0, 0).with_span(1, 2), Size::new(180.0, 28.0));
    grid.add_child(GridPlacement::new(1, 0), Size::new(64.0, 20.0));
    grid.add_child(GridPlacement::new(1, 1), Size::new(140.0, 24.0));
    grid.add_child(GridPlacement::new(2, 0).with_span(1, 2), Size::new(10.0, 10.0));
    grid.add_child(GridPlacement::new(3, 1), Size::new(90.0, 32.0));
    grid
}

#[test]
fn test_form_layout() {
    init_tracing();
    let mut grid = form_grid();

    let rects = grid.layout(Size::new(400.0, 300.0));

    assert_rect_near(rects[0], Rect::new(0.0, 0.0, 400.0, 28.0));
    assert_rect_near(rects[1], Rect::new(0.0, 28.0, 64.0, 24.0));
    assert_rect_near(rects[2], Rect::new(64.0, 28.0, 336.0, 24.0));
    assert_rect_near(rects[3], Rect::new(0.0, 52.0, 400.0, 216.0));
    assert_rect_near(rects[4], Rect::new(64.0, 268.0, 336.0, 32.0));

    assert_tracks_consistent(grid.columns());
    assert_tracks_consistent(grid.rows());
}

#[test]
fn test_narrow_container_keeps_star_minimum() {
    init_tracing();
    let mut grid = form_grid();

    let desired = grid.measure(Size::new(120.0, 300.0));

    // The field column never drops below its minimum even when that overflows.
    assert_near(grid.columns()[0].actual_size, 64.0);
    assert_near(grid.columns()[1].actual_size, 100.0);
    assert_near(desired.width, 164.0);
    assert_tracks_consistent(grid.columns());
}

#[test]
fn test_relayout_is_stable() {
    init_tracing();
    let mut grid = form_grid();

    let first = grid.layout(Size::new(400.0, 300.0));
    let second = grid.layout(Size::new(400.0, 300.0));

    assert_eq!(first, second);
}

#[test]
fn test_resize_redistributes_stars_only() {
    init_tracing();
    let mut grid = form_grid();

    grid.layout(Size::new(400.0, 300.0));
    let rects = grid.layout(Size::new(600.0, 400.0));

    assert_rect_near(rects[1], Rect::new(0.0, 28.0, 64.0, 24.0));
    assert_rect_near(rects[2], Rect::new(64.0, 28.0, 536.0, 24.0));
    assert_rect_near(rects[4], Rect::new(64.0, 368.0, 536.0, 32.0));
}

#[test]
fn test_sum_matches_available_without_clamping() {
    let mut tracks = vec![
        Track::fixed(35.0),
        Track::star(1.5),
        Track::star(2.5),
        Track::star(0.25),
        Track::fixed(12.5),
    ];

    let result = distribute(&mut tracks, 913.0);

    let total: f64 = tracks.iter().map(|t| t.actual_size).sum();
    assert_near(total, 913.0);
    assert_near(result.unallocated, 0.0);
    assert_eq!(result.passes, 1);
    assert_tracks_consistent(&tracks);
}

#[test]
fn test_cascading_bounds_halt_within_track_count() {
    // Alternate tight minimums and maximums so several passes clamp.
    let mut tracks: Vec<Track> = (0..12)
        .map(|i| {
            let weight = 1.0 + i as f64;
            if i % 2 == 0 {
                Track::star(weight).with_bounds(0.0, 4.0 * (i + 1) as f64)
            } else {
                Track::star(weight).with_bounds(60.0 - 3.0 * i as f64, f64::INFINITY)
            }
        })
        .collect();

    let star_count = tracks.len();
    let result = distribute(&mut tracks, 700.0);

    assert!(result.passes <= star_count, "{} passes for {} tracks", result.passes, star_count);
    assert_tracks_consistent(&tracks);
}

#[test]
fn test_layout_from_json_description() {
    init_tracing();
    let json = r#"{
        "columns": [{"size": 50}, {"size": "*"}, {"size": "2*"}],
        "rows": [{"size": "Auto"}, {"size": "*", "max_size": 40}],
        "children": [
            {"row": 0, "column": 0, "width": 20, "height": 18},
            {"row": 1, "column": 1, "column_span": 2}
        ]
    }"#;

    let mut grid = GridDefinition::from_json(json).unwrap().build();
    let rects = grid.layout(Size::new(250.0, 200.0));

    assert_near(grid.columns()[1].actual_size, 66.67);
    assert_near(grid.columns()[2].actual_offset, 116.67);
    assert_rect_near(rects[0], Rect::new(0.0, 0.0, 50.0, 18.0));
    assert_rect_near(rects[1], Rect::new(50.0, 18.0, 200.0, 40.0));
}

#[test]
fn test_track_redefinition_takes_effect() {
    init_tracing();
    let mut grid = form_grid();
    grid.layout(Size::new(400.0, 300.0));

    grid.set_columns(&[def(GridLength::Pixel(100.0)), def(GridLength::Star(1.0))]);
    let rects = grid.layout(Size::new(400.0, 300.0));

    assert_rect_near(rects[1], Rect::new(0.0, 28.0, 100.0, 24.0));
    assert_rect_near(rects[2], Rect::new(100.0, 28.0, 300.0, 24.0));
}

#[test]
fn test_star_rows_clamped_both_ways_leave_gap() {
    init_tracing();
    let mut grid = GridLayout::new(
        &[],
        &[
            def(GridLength::Star(1.0)).with_min(60.0),
            def(GridLength::Star(1.0)).with_max(30.0),
        ],
    );
    let top = grid.add_child(GridPlacement::new(0, 0), Size::zero());
    let bottom = grid.add_child(GridPlacement::new(1, 0), Size::zero());

    let desired = grid.measure(Size::new(200.0, 100.0));
    grid.arrange();

    // Both rows clamp on the first share; nothing is handed back out.
    assert_near(desired.height, 90.0);
    assert_eq!(grid.child_rect(top), Some(Rect::new(0.0, 0.0, 200.0, 60.0)));
    assert_eq!(grid.child_rect(bottom), Some(Rect::new(0.0, 60.0, 200.0, 30.0)));
    assert_tracks_consistent(grid.rows());
}
