//! # Fret Window Placement
//!
//! The fretboard only shows `fret_count` frets at a time (5 in the editor).
//! Row 1 of the window is absolute fret `starting_fret + 1`; the open string
//! (fret 0) is visible only while the window sits at the nut.
//!
//! When a saved chord is opened for editing, [`auto_starting_fret`] picks a
//! window that shows every marker:
//!
//! 1. No markers: keep the saved start.
//! 2. Every marker already visible from the saved start: keep it.
//! 3. Open strings are used and every fretted marker fits in frets
//!    `1..=fret_count`: move to the nut (start 0).
//! 4. Otherwise start one fret below the lowest fretted marker. If the
//!    highest marker still falls past the window, slide up so the highest
//!    fret is the last visible row.
//!
//! A window exists for a marker set only if the fretted markers span at most
//! `fret_count` frets (and, when open strings are used, the highest fret is
//! at most `fret_count`). For sets with no such window the result always
//! keeps the highest fret visible.

use crate::marker::Marker;

/// Number of frets visible in the chord editor
pub const FRET_COUNT: u8 = 5;

/// Highest starting fret the editor stepper allows
pub const MAX_STARTING_FRET: u8 = 19;

/// Whether `fret` is drawn in a window of `fret_count` rows starting at `starting_fret`
pub fn is_fret_visible(fret: u8, starting_fret: u8, fret_count: u8) -> bool {
    if fret == 0 {
        return starting_fret == 0;
    }
    let fret = fret as u16;
    let start = starting_fret as u16;
    fret > start && fret <= start + fret_count as u16
}

/// True when every marker is visible in the window
pub fn window_shows_all(markers: &[Marker], starting_fret: u8, fret_count: u8) -> bool {
    markers
        .iter()
        .all(|m| is_fret_visible(m.fret, starting_fret, fret_count))
}

/// Pick the editor's starting fret for a saved chord (5-fret window)
pub fn auto_starting_fret(markers: &[Marker], saved_start: u8) -> u8 {
    auto_starting_fret_with(markers, saved_start, FRET_COUNT)
}

/// [`auto_starting_fret`] for an arbitrary window size
pub fn auto_starting_fret_with(markers: &[Marker], saved_start: u8, fret_count: u8) -> u8 {
    if markers.is_empty() {
        return saved_start;
    }

    if window_shows_all(markers, saved_start, fret_count) {
        return saved_start;
    }

    let max_fret = markers.iter().map(|m| m.fret).max().unwrap_or(0);
    let uses_open_strings = markers.iter().any(Marker::is_open);

    if uses_open_strings && max_fret <= fret_count {
        return 0;
    }

    // Only open strings would have returned above, so this min always exists in practice
    let min_fretted = markers
        .iter()
        .map(|m| m.fret)
        .filter(|f| *f > 0)
        .min()
        .unwrap_or(1);
    let candidate = min_fretted.saturating_sub(1);

    if max_fret as u16 > candidate as u16 + fret_count as u16 {
        max_fret.saturating_sub(fret_count)
    } else {
        candidate
    }
}

/// Starting fret after pressing the editor's "-" button
pub fn step_down(starting_fret: u8) -> u8 {
    starting_fret.saturating_sub(1)
}

/// Starting fret after pressing the editor's "+" button, capped at `max`
pub fn step_up(starting_fret: u8, max: u8) -> u8 {
    starting_fret.saturating_add(1).min(max)
}
