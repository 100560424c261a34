//! Fretboard markers.
//!
//! A marker is a finger position: a string index and an absolute fret number,
//! where fret 0 is the open string. Strings are numbered from 0.

use serde::{Deserialize, Serialize};

/// A single finger position on the fretboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Marker {
    pub string: u8,
    pub fret: u8,
}

impl Marker {
    pub fn new(string: u8, fret: u8) -> Self {
        Self { string, fret }
    }

    /// True for an open-string marker (fret 0)
    pub fn is_open(&self) -> bool {
        self.fret == 0
    }
}

/// Check whether a marker sits at (string, fret)
pub fn has_marker(markers: &[Marker], string: u8, fret: u8) -> bool {
    markers.iter().any(|m| m.string == string && m.fret == fret)
}

/// Add the marker if it is absent, remove it if present.
///
/// This is what a tap on the fretboard does in the chord editor. Order of the
/// remaining markers is preserved and new markers are appended.
pub fn toggle_marker(markers: &[Marker], marker: Marker) -> Vec<Marker> {
    if has_marker(markers, marker.string, marker.fret) {
        markers.iter().copied().filter(|m| *m != marker).collect()
    } else {
        let mut next = markers.to_vec();
        next.push(marker);
        next
    }
}

/// Drop repeated (string, fret) pairs, keeping the first occurrence
pub fn dedup_markers(markers: &[Marker]) -> Vec<Marker> {
    let mut seen = Vec::with_capacity(markers.len());
    for marker in markers {
        if !seen.contains(marker) {
            seen.push(*marker);
        }
    }
    seen
}

/// Lowest and highest fret used by any marker
pub fn fret_span(markers: &[Marker]) -> Option<(u8, u8)> {
    let min = markers.iter().map(|m| m.fret).min()?;
    let max = markers.iter().map(|m| m.fret).max()?;
    Some((min, max))
}
