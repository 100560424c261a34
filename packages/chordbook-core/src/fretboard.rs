//! # Fretboard View
//!
//! Geometry for a string x fret grid, independent of any drawing surface.
//!
//! ```text
//!        E   A   D   G   B   E        <- tuning labels
//!        ┿━━━┿━━━┿━━━┿━━━┿━━━┿        <- nut (row 0, only at starting fret 0)
//!   1    │   │   │   ●   │   │
//!        ┼───┼───┼───┼───┼───┼
//!   2    │   │   ●   │   ●   │
//!        ┼───┼───┼───┼───┼───┼
//! ```
//!
//! Row `r` in `1..=fret_count` is absolute fret `starting_fret + r`. The view
//! owns no editing state: taps are reported as `(string, absolute fret)`
//! markers and the caller decides whether to add or remove them. Identical
//! inputs always produce identical geometry.

use serde::Serialize;

use crate::chord::{Chord, DEFAULT_STRING_COUNT, DEFAULT_TUNING};
use crate::fret_window::{is_fret_visible, FRET_COUNT};
use crate::marker::{has_marker, Marker};
use crate::template::ChordTemplate;

pub const PADDING_TOP: f64 = 40.0;
pub const PADDING_BOTTOM: f64 = 20.0;
pub const PADDING_LEFT: f64 = 50.0;
pub const PADDING_RIGHT: f64 = 20.0;
pub const FRET_HEIGHT: f64 = 60.0;
/// 44px keeps every tap target finger sized
pub const STRING_SPACING: f64 = 44.0;
pub const NUT_WIDTH: f64 = 6.0;
pub const MARKER_RADIUS: f64 = 14.0;
pub const TAP_TARGET_SIZE: f64 = 44.0;

/// Inputs of a fretboard diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Fretboard {
    pub markers: Vec<Marker>,
    pub string_count: u8,
    pub tuning: String,
    pub fret_count: u8,
    pub starting_fret: u8,
}

/// One tappable cell of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FretCell {
    pub string: u8,
    /// Visual row: 0 is the open-string row at the nut
    pub row: u8,
    pub absolute_fret: u8,
    pub x: f64,
    pub y: f64,
    pub marked: bool,
}

impl FretCell {
    pub fn marker(&self) -> Marker {
        Marker::new(self.string, self.absolute_fret)
    }
}

impl Default for Fretboard {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            string_count: DEFAULT_STRING_COUNT,
            tuning: DEFAULT_TUNING.to_string(),
            fret_count: FRET_COUNT,
            starting_fret: 0,
        }
    }
}

impl Fretboard {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self {
            markers,
            ..Self::default()
        }
    }

    /// Preview of a saved chord at its stored window
    pub fn for_chord(chord: &Chord) -> Self {
        Self {
            markers: chord.markers.clone(),
            string_count: if chord.string_count == 0 {
                DEFAULT_STRING_COUNT
            } else {
                chord.string_count
            },
            tuning: if chord.tuning.is_empty() {
                DEFAULT_TUNING.to_string()
            } else {
                chord.tuning.clone()
            },
            fret_count: FRET_COUNT,
            starting_fret: chord.starting_fret,
        }
    }

    pub fn for_template(template: &ChordTemplate) -> Self {
        Self {
            markers: template.markers.clone(),
            string_count: template.string_count,
            tuning: template.tuning.clone(),
            fret_count: FRET_COUNT,
            starting_fret: template.starting_fret,
        }
    }

    pub fn with_window(mut self, starting_fret: u8, fret_count: u8) -> Self {
        self.starting_fret = starting_fret;
        self.fret_count = fret_count;
        self
    }

    /// One label per string, taken from the tuning string
    pub fn tuning_labels(&self) -> Vec<String> {
        self.tuning
            .chars()
            .take(self.string_count as usize)
            .map(String::from)
            .collect()
    }

    /// The open-string row only exists while the window sits at the nut
    pub fn shows_open_row(&self) -> bool {
        self.starting_fret == 0
    }

    /// Absolute fret shown on visual row `row` (row 0 is the open string)
    pub fn absolute_fret(&self, row: u8) -> u8 {
        if row == 0 {
            0
        } else {
            self.starting_fret.saturating_add(row)
        }
    }

    /// Visual row of an absolute fret, if it is inside the window
    pub fn row_of(&self, absolute_fret: u8) -> Option<u8> {
        if !is_fret_visible(absolute_fret, self.starting_fret, self.fret_count) {
            return None;
        }
        if absolute_fret == 0 {
            Some(0)
        } else {
            Some(absolute_fret - self.starting_fret)
        }
    }

    pub fn neck_width(&self) -> f64 {
        self.string_count.saturating_sub(1) as f64 * STRING_SPACING
    }

    pub fn neck_height(&self) -> f64 {
        self.fret_count as f64 * FRET_HEIGHT
    }

    pub fn width(&self) -> f64 {
        PADDING_LEFT + self.neck_width() + PADDING_RIGHT
    }

    pub fn height(&self) -> f64 {
        PADDING_TOP + self.neck_height() + PADDING_BOTTOM
    }

    pub fn string_x(&self, string: u8) -> f64 {
        PADDING_LEFT + string as f64 * STRING_SPACING
    }

    /// Y of the fret line below row `row` (row 0 is the nut line)
    pub fn fret_y(&self, row: u8) -> f64 {
        PADDING_TOP + row as f64 * FRET_HEIGHT
    }

    /// Centre of a cell: on the nut for row 0, midway between fret lines otherwise
    pub fn cell_center(&self, string: u8, row: u8) -> (f64, f64) {
        let y = if row == 0 {
            PADDING_TOP
        } else {
            self.fret_y(row) - FRET_HEIGHT / 2.0
        };
        (self.string_x(string), y)
    }

    /// Every tappable cell, open row first, then row by row
    pub fn cells(&self) -> Vec<FretCell> {
        let first_row = if self.shows_open_row() { 0 } else { 1 };
        let mut cells = Vec::new();
        for row in first_row..=self.fret_count {
            let absolute_fret = self.absolute_fret(row);
            for string in 0..self.string_count {
                let (x, y) = self.cell_center(string, row);
                cells.push(FretCell {
                    string,
                    row,
                    absolute_fret,
                    x,
                    y,
                    marked: has_marker(&self.markers, string, absolute_fret),
                });
            }
        }
        cells
    }

    /// Cells that carry a marker
    pub fn placed_markers(&self) -> Vec<FretCell> {
        self.cells().into_iter().filter(|c| c.marked).collect()
    }

    /// Markers that fall outside the current window (kept, just not drawn)
    pub fn hidden_markers(&self) -> Vec<Marker> {
        self.markers
            .iter()
            .copied()
            .filter(|m| m.string >= self.string_count || self.row_of(m.fret).is_none())
            .collect()
    }

    /// Report a tap on (string, absolute fret) to `on_toggle`.
    ///
    /// Taps outside the grid are ignored; returns whether the callback ran.
    pub fn tap<F>(&self, string: u8, absolute_fret: u8, on_toggle: F) -> bool
    where
        F: FnOnce(Marker),
    {
        if string >= self.string_count || self.row_of(absolute_fret).is_none() {
            return false;
        }
        on_toggle(Marker::new(string, absolute_fret));
        true
    }

    /// Map a point to the cell whose tap target contains it
    pub fn hit_test(&self, x: f64, y: f64) -> Option<Marker> {
        let half = TAP_TARGET_SIZE / 2.0;
        self.cells()
            .into_iter()
            .find(|c| (x - c.x).abs() <= half && (y - c.y).abs() <= half)
            .map(|c| c.marker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn am() -> Fretboard {
        Fretboard::new(vec![Marker::new(3, 2), Marker::new(2, 2), Marker::new(1, 1)])
    }

    #[test]
    fn test_open_row_only_at_nut() {
        let board = am();
        assert!(board.shows_open_row());
        assert_eq!(board.cells().len(), 6 * 6);

        let moved = am().with_window(3, 5);
        assert!(!moved.shows_open_row());
        assert_eq!(moved.cells().len(), 6 * 5);
        assert!(moved.cells().iter().all(|c| c.absolute_fret >= 4));
    }

    #[test]
    fn test_rows_map_to_absolute_frets() {
        let board = Fretboard::default().with_window(7, 5);
        assert_eq!(board.absolute_fret(1), 8);
        assert_eq!(board.absolute_fret(5), 12);
        assert_eq!(board.row_of(8), Some(1));
        assert_eq!(board.row_of(7), None);
        assert_eq!(board.row_of(0), None);
        assert_eq!(Fretboard::default().row_of(0), Some(0));
    }

    #[test]
    fn test_markers_drawn_at_matching_cells() {
        let board = am();
        let placed: Vec<Marker> = board.placed_markers().iter().map(|c| c.marker()).collect();
        assert_eq!(placed.len(), 3);
        assert!(placed.contains(&Marker::new(1, 1)));
        assert!(placed.contains(&Marker::new(3, 2)));
    }

    #[test]
    fn test_markers_outside_window_are_hidden() {
        let board = am().with_window(1, 5);
        assert_eq!(board.hidden_markers(), vec![Marker::new(1, 1)]);
        assert_eq!(board.placed_markers().len(), 2);
    }

    #[test]
    fn test_geometry() {
        let board = am();
        assert_eq!(board.width(), 50.0 + 5.0 * 44.0 + 20.0);
        assert_eq!(board.height(), 40.0 + 5.0 * 60.0 + 20.0);
        assert_eq!(board.cell_center(0, 0), (50.0, 40.0));
        assert_eq!(board.cell_center(2, 1), (50.0 + 88.0, 70.0));
    }

    #[test]
    fn test_tap_reports_absolute_fret() {
        let board = Fretboard::default().with_window(4, 5);
        let mut tapped = None;
        assert!(board.tap(2, 6, |m| tapped = Some(m)));
        assert_eq!(tapped, Some(Marker::new(2, 6)));

        let mut ignored = None;
        assert!(!board.tap(2, 0, |m| ignored = Some(m)));
        assert!(!board.tap(6, 6, |m| ignored = Some(m)));
        assert_eq!(ignored, None);
    }

    #[test]
    fn test_hit_test_round_trips_cell_centres() {
        let board = Fretboard::default().with_window(2, 5);
        for cell in board.cells() {
            assert_eq!(board.hit_test(cell.x + 3.0, cell.y - 3.0), Some(cell.marker()));
        }
        assert_eq!(board.hit_test(0.0, 0.0), None);
    }

    #[test]
    fn test_tuning_labels_follow_string_count() {
        let mut board = Fretboard::default();
        board.string_count = 4;
        assert_eq!(board.tuning_labels(), vec!["E", "A", "D", "G"]);
    }

    #[test]
    fn test_identical_inputs_identical_geometry() {
        assert_eq!(am().cells(), am().cells());
    }
}
