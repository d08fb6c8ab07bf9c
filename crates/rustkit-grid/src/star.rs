//! Star (proportional) track distribution.
//!
//! Star tracks share whatever space is left once fixed and content-driven
//! tracks have been sized. Shares are proportional to the star weight and
//! then clamped to each track's bounds. A clamped track is frozen at its
//! clamped size, the space it took (or gave back) is accounted for, and the
//! remaining unfrozen tracks are redistributed. Every pass either finishes or
//! freezes at least one track, so the loop runs at most once per weighted
//! star track.
//!
//! Shares are not rounded. Fractional remainders stay in the individual
//! track sizes, so the sum of sizes matches the available space only up to
//! floating-point accumulation.

use tracing::{debug, trace};

use crate::track::{SizeMode, Track};

/// Tolerance for deciding whether clamping changed a share.
const EPSILON: f64 = 1e-9;

/// Outcome of a distribution run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
    /// Redistribution passes over the weighted pool.
    pub passes: usize,
    /// Space that no track received.
    pub unallocated: f64,
}

/// Size every track against `available_space` and assign offsets.
///
/// Fixed and content-driven tracks are resolved first (from their declared
/// value and desired size); star tracks split what remains.
pub fn distribute(tracks: &mut [Track], available_space: f64) -> Distribution {
    // Step 1: fixed and content tracks take their space first
    for track in tracks.iter_mut() {
        track.resolve_non_proportional();
    }
    let non_star: f64 = tracks
        .iter()
        .filter(|t| t.mode != SizeMode::Proportional)
        .map(|t| t.actual_size)
        .sum();

    let available = if available_space.is_finite() {
        available_space.max(0.0)
    } else {
        // Unbounded space gives star tracks nothing to divide.
        non_star
    };
    let mut remaining = (available - non_star).max(0.0);

    // Step 2: unweighted star tracks collapse to their minimum
    let mut pool: Vec<usize> = Vec::new();
    for (i, track) in tracks.iter_mut().enumerate() {
        if !track.is_proportional() {
            continue;
        }
        if track.star_weight().is_some() {
            pool.push(i);
        } else {
            let size = track.set_actual_size(track.min_size);
            remaining = (remaining - size).max(0.0);
        }
    }

    // Steps 3-4: proportional shares with freezing
    let mut passes = 0;
    let mut shares: Vec<(usize, f64, f64)> = Vec::with_capacity(pool.len());

    while !pool.is_empty() {
        passes += 1;

        let total_weight: f64 = pool.iter().filter_map(|&i| tracks[i].star_weight()).sum();
        if total_weight <= 0.0 {
            break;
        }

        shares.clear();
        for &i in &pool {
            let weight = tracks[i].star_weight().unwrap_or(0.0);
            let tentative = remaining * (weight / total_weight);
            shares.push((i, tentative, tracks[i].clamp(tentative)));
        }

        let any_clamped = shares.iter().any(|&(_, t, c)| (c - t).abs() > EPSILON);
        if !any_clamped {
            for &(i, _, clamped) in &shares {
                tracks[i].actual_size = clamped;
            }
            break;
        }

        // Every clamped track leaves the pool, whichever bound it hit.
        for &(i, tentative, clamped) in &shares {
            if (clamped - tentative).abs() > EPSILON {
                tracks[i].actual_size = clamped;
                remaining = (remaining - clamped).max(0.0);
                pool.retain(|&p| p != i);
                trace!(track = i, tentative, clamped, "star track frozen");
            }
        }
    }

    // Step 5: offsets in declaration order
    let mut offset = 0.0;
    for track in tracks.iter_mut() {
        track.actual_offset = offset;
        offset += track.actual_size;
    }

    let unallocated = (available - offset).max(0.0);

    debug!(
        tracks = tracks.len(),
        available = available_space,
        passes,
        unallocated,
        "star distribution complete"
    );

    Distribution {
        passes,
        unallocated,
    }
}
